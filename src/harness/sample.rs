//! Sample input generation for runs without an input file.
//!
//! Generated text mixes stretches with different compressibility so that the
//! codecs separate visibly in the report:
//! - runs of a single character
//! - word-like text over a small vocabulary
//! - a repeating short pattern
//! - random printable characters

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const VOCABULARY: &[&str] = &[
    "the", "codec", "window", "symbol", "tree", "prefix", "interval", "rotation", "match",
    "lossless", "and", "of", "a", "to", "in",
];

const PRINTABLE: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789 .,;:!?";

/// Deterministic pseudo-text of exactly `len` characters for `seed`.
pub fn generate_sample_text(seed: u64, len: usize) -> String {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut text = String::with_capacity(len);

    while text.len() < len {
        let stretch = rng.gen_range(16..128);
        match rng.gen_range(0..10) {
            // 20% runs of one character
            0..=1 => {
                let ch = PRINTABLE[rng.gen_range(0..PRINTABLE.len())] as char;
                text.extend(std::iter::repeat(ch).take(stretch));
            }
            // 50% word-like text
            2..=6 => {
                let start = text.len();
                while text.len() - start < stretch {
                    if let Some(word) = VOCABULARY.choose(&mut rng) {
                        text.push_str(word);
                    }
                    text.push(if rng.gen_bool(0.1) { '\n' } else { ' ' });
                }
            }
            // 10% repeating pattern
            7 => {
                let pattern: Vec<u8> = (0..rng.gen_range(2..6))
                    .map(|_| PRINTABLE[rng.gen_range(0..PRINTABLE.len())])
                    .collect();
                text.extend(pattern.iter().cycle().take(stretch).map(|&b| b as char));
            }
            // 20% random printable characters
            _ => {
                text.extend(
                    (0..stretch).map(|_| PRINTABLE[rng.gen_range(0..PRINTABLE.len())] as char),
                );
            }
        }
    }

    // Every generated character is ASCII, so byte and char lengths agree.
    text.truncate(len);
    text
}
