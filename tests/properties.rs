//! Property-based tests for the codecs.
//!
//! These check invariants that must hold for all inputs, using proptest to
//! generate random byte strings and text.

use codec_bench::compression::huffman::{
    build_code_table, build_frequency_table, build_huffman_tree,
};
use codec_bench::compression::{
    Algorithm, ArithmeticCodec, BwtCodec, Codec, EncodedForm, HuffmanCodec, Lz77Codec, Symbol,
};
use codec_bench::harness::{run_benchmark, BenchmarkConfig};
use proptest::prelude::*;

/// Byte strings over a small alphabet, so matches and repeats are common.
fn repetitive_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    let symbol = prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), any::<u8>()];
    proptest::collection::vec(symbol, 0..=max_len)
}

fn round_trip<S: Symbol, C: Codec<S>>(codec: &C, input: &[S]) -> Vec<S> {
    let encoded = codec.compress(input).expect("compression should succeed");
    codec
        .decompress(&encoded)
        .expect("decompression should succeed for a fresh encoding")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    // =======================================================================
    // ROUNDTRIP INVARIANT: decompress(compress(x)) == x
    // =======================================================================

    #[test]
    fn roundtrip_huffman_bytes(input in repetitive_bytes(300)) {
        prop_assert_eq!(round_trip(&HuffmanCodec, &input), input);
    }

    #[test]
    fn roundtrip_huffman_text(input in "\\PC{0,120}") {
        let symbols: Vec<char> = input.chars().collect();
        prop_assert_eq!(round_trip(&HuffmanCodec, &symbols), symbols);
    }

    #[test]
    fn roundtrip_bwt_bytes(input in repetitive_bytes(300)) {
        // Inputs holding every byte value have no free marker.
        let Ok(codec) = BwtCodec::for_input(&input) else {
            return Ok(());
        };
        prop_assert_eq!(round_trip(&codec, &input), input);
    }

    #[test]
    fn roundtrip_bwt_text(input in "[a-z $]{0,80}") {
        let symbols: Vec<char> = input.chars().collect();
        let codec = BwtCodec::for_input(&symbols).unwrap();
        prop_assert_eq!(round_trip(&codec, &symbols), symbols);
    }

    #[test]
    fn roundtrip_lz77_small_window(
        input in repetitive_bytes(300),
        window in 1usize..32,
        lookahead in 1usize..16,
    ) {
        let codec = Lz77Codec::new(window, lookahead).unwrap();
        prop_assert_eq!(round_trip(&codec, &input), input);
    }

    #[test]
    fn roundtrip_lz77_text(input in "\\PC{0,120}") {
        let symbols: Vec<char> = input.chars().collect();
        prop_assert_eq!(round_trip(&Lz77Codec::default(), &symbols), symbols);
    }

    #[test]
    fn roundtrip_arithmetic_sized(input in repetitive_bytes(48)) {
        let codec = ArithmeticCodec::sized_for(&input);
        let encoded = codec.compress(&input).unwrap();
        let report = codec.decompress_with_report(&encoded).unwrap();
        prop_assert!(!report.precision_exhausted());
        prop_assert_eq!(report.symbols, input);
    }

    #[test]
    fn roundtrip_arithmetic_default_short(input in "[a-e]{0,20}") {
        let symbols: Vec<char> = input.chars().collect();
        prop_assert_eq!(round_trip(&ArithmeticCodec::default(), &symbols), symbols);
    }

    // =======================================================================
    // STRUCTURAL INVARIANTS
    // =======================================================================

    #[test]
    fn huffman_codes_are_prefix_free(input in repetitive_bytes(300)) {
        let table = build_frequency_table(&input);
        let Some(tree) = build_huffman_tree(&table) else {
            prop_assert!(input.is_empty());
            return Ok(());
        };
        let codes = build_code_table(&tree);
        prop_assert_eq!(codes.len(), table.len());
        for (a, code_a) in &codes {
            prop_assert!(!code_a.is_empty());
            for (b, code_b) in &codes {
                if a != b {
                    prop_assert!(!code_b.starts_with(code_a.as_str()));
                }
            }
        }
    }

    #[test]
    fn huffman_never_exceeds_fixed_width(input in repetitive_bytes(300)) {
        let encoded = HuffmanCodec.compress(&input).unwrap();
        prop_assert!(HuffmanCodec.encoded_size(&encoded) <= input.len() * 8);
    }

    #[test]
    fn bwt_preserves_symbol_multiset(input in "[a-z]{0,80}") {
        let symbols: Vec<char> = input.chars().collect();
        let codec = BwtCodec::new('$');
        let encoded = codec.compress(&symbols).unwrap();

        let mut expected = symbols.clone();
        expected.push('$');
        expected.sort_unstable();
        let mut actual = encoded.data.clone();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
        prop_assert!(encoded.original_index < encoded.data.len());
    }

    #[test]
    fn lz77_tokens_respect_window(
        input in repetitive_bytes(300),
        window in 1usize..32,
        lookahead in 1usize..16,
    ) {
        let codec = Lz77Codec::new(window, lookahead).unwrap();
        let tokens = codec.compress(&input).unwrap();
        let mut produced = 0;
        for token in &tokens {
            prop_assert!(token.offset <= produced);
            prop_assert!(token.offset <= window);
            prop_assert!(token.length <= lookahead);
            prop_assert_eq!(token.offset == 0, token.length == 0);
            produced += token.length + usize::from(token.next.is_some());
        }
        prop_assert_eq!(produced, input.len());
    }

    #[test]
    fn encoded_size_is_deterministic(input in repetitive_bytes(64)) {
        for algorithm in Algorithm::defaults_for(&input).unwrap() {
            let first = algorithm.compress(&input).unwrap();
            let second = algorithm.compress(&input).unwrap();
            prop_assert_eq!(algorithm.encoded_size(&first), algorithm.encoded_size(&second));
            prop_assert_eq!(algorithm.encoded_size(&first), algorithm.encoded_size(&first));
        }
    }
}

// ===========================================================================
// SCENARIOS
// ===========================================================================

#[test]
fn scenario_banana_bwt() {
    let input: Vec<char> = "banana".chars().collect();
    let encoded = BwtCodec::default().compress(&input).unwrap();
    assert_eq!(encoded.data.iter().collect::<String>(), "annb$aa");
    assert_eq!(encoded.original_index, 4);
}

#[test]
fn scenario_compress_to_file() {
    let path = std::env::temp_dir()
        .join(format!("codec_bench_scenario_{}.json", std::process::id()));
    let input: Vec<u8> = b"she sells sea shells, $5 each".to_vec();
    for algorithm in Algorithm::defaults_for(&input).unwrap() {
        let encoded = algorithm.compress_to_file(&input, &path).unwrap();
        assert_eq!(EncodedForm::load(&path).unwrap(), encoded);
        assert_eq!(algorithm.decompress_from_file(&path).unwrap(), input);
    }
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn scenario_mismatched_variant() {
    let input: Vec<char> = "variant".chars().collect();
    let algorithms = Algorithm::defaults_for(&input).unwrap();
    let huffman = algorithms[0].compress(&input).unwrap();
    assert!(matches!(huffman, EncodedForm::Huffman(_)));
    for algorithm in &algorithms[1..] {
        assert!(algorithm.decompress(&huffman).is_err());
    }
}

#[test]
fn scenario_binary_benchmark() {
    let input: Vec<u8> = (0..=255u8).chain(0..=255u8).collect();
    // Every byte value occurs, so no BWT marker is free and BWT is skipped.
    let outcome = run_benchmark(&BenchmarkConfig::default(), &input).unwrap();
    let names: Vec<&str> = outcome.results.iter().map(|r| r.algorithm).collect();
    assert_eq!(names, vec!["Huffman Coding", "Arithmetic Coding", "LZ77"]);
    assert_eq!(outcome.verifications.len(), 3);
    assert!(outcome.verifications[0].round_trip);
    assert!(outcome.verifications[2].round_trip);

    let input: Vec<u8> = (1..=255u8).chain(1..=255u8).collect();
    let outcome = run_benchmark(&BenchmarkConfig::default(), &input).unwrap();
    let names: Vec<&str> = outcome.results.iter().map(|r| r.algorithm).collect();
    assert_eq!(names, vec!["Huffman Coding", "Arithmetic Coding", "BWT", "LZ77"]);
    // Input plus the zero-byte marker, and the 32-bit index.
    assert_eq!(outcome.results[2].encoded_size, 511 * 8 + 32);
}
