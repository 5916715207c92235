//! Configuration for benchmark runs.
//!
//! Every option has a default, so the benchmark runs with no arguments on a
//! generated sample.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use log::warn;

use crate::cs::compression::arithmetic::{self, ArithmeticCodec};
use crate::cs::compression::bwt::BwtCodec;
use crate::cs::compression::huffman::HuffmanCodec;
use crate::cs::compression::lz77::{self, Lz77Codec};
use crate::cs::compression::{Algorithm, Symbol};
use crate::error::{Error, Result};
use crate::harness::loader::DataMode;

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SAMPLE_LEN: usize = 2000;

/// Significant digits used by arithmetic coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Fixed(usize),
    /// Sized from the entropy of the input.
    Auto,
}

impl Default for Precision {
    fn default() -> Self {
        Precision::Fixed(arithmetic::DEFAULT_PRECISION)
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "auto" {
            return Ok(Precision::Auto);
        }
        s.parse()
            .map(Precision::Fixed)
            .map_err(|_| Error::invalid_configuration(format!("invalid precision {:?}", s)))
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Fixed(digits) => write!(f, "{} digits", digits),
            Precision::Auto => f.write_str("auto"),
        }
    }
}

/// Complete configuration for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    // === Input ===
    /// Input file (None = generate sample text)
    pub input_file: Option<PathBuf>,
    pub mode: DataMode,
    pub seed: u64,
    pub sample_len: usize,

    // === Codecs ===
    pub precision: Precision,
    pub window_size: usize,
    pub lookahead_size: usize,
    /// BWT end marker (None = `$`, or the first free candidate if `$` occurs)
    pub end_marker: Option<char>,

    // === Behavior ===
    /// Directory for encoded artifacts (None = don't write)
    pub artifact_dir: Option<PathBuf>,
    pub verify: bool,
    pub verbose: bool,
    pub help: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            input_file: None,
            mode: DataMode::Text,
            seed: DEFAULT_SEED,
            sample_len: DEFAULT_SAMPLE_LEN,
            precision: Precision::default(),
            window_size: lz77::DEFAULT_WINDOW_SIZE,
            lookahead_size: lz77::DEFAULT_LOOKAHEAD_SIZE,
            end_marker: None,
            artifact_dir: None,
            verify: true,
            verbose: false,
            help: false,
        }
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> Result<&'a str> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| Error::invalid_configuration(format!("{} requires {}", flag, what)))
}

fn number<T: FromStr>(raw: &str, flag: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::invalid_configuration(format!("invalid value for {}: {:?}", flag, raw)))
}

impl BenchmarkConfig {
    /// Parses command-line arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = BenchmarkConfig::default();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--in" => {
                    i += 1;
                    config.input_file = Some(PathBuf::from(value(args, i, flag, "a path")?));
                }
                "--mode" => {
                    i += 1;
                    config.mode = value(args, i, flag, "\"text\" or \"binary\"")?.parse()?;
                }
                "--precision" => {
                    i += 1;
                    config.precision = value(args, i, flag, "a number or \"auto\"")?.parse()?;
                }
                "--window" => {
                    i += 1;
                    config.window_size = number(value(args, i, flag, "a number")?, flag)?;
                }
                "--lookahead" => {
                    i += 1;
                    config.lookahead_size = number(value(args, i, flag, "a number")?, flag)?;
                }
                "--marker" => {
                    i += 1;
                    let raw = value(args, i, flag, "a single character")?;
                    let mut chars = raw.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => config.end_marker = Some(ch),
                        _ => {
                            return Err(Error::invalid_configuration(format!(
                                "--marker must be a single character, got {:?}",
                                raw
                            )))
                        }
                    }
                }
                "--seed" => {
                    i += 1;
                    config.seed = number(value(args, i, flag, "a number")?, flag)?;
                }
                "--sample-len" => {
                    i += 1;
                    config.sample_len = number(value(args, i, flag, "a number")?, flag)?;
                }
                "--artifacts" => {
                    i += 1;
                    config.artifact_dir = Some(PathBuf::from(value(args, i, flag, "a directory")?));
                }
                "--no-verify" => config.verify = false,
                "--verbose" | "-v" => config.verbose = true,
                "--help" | "-h" => config.help = true,
                _ => {
                    return Err(Error::invalid_configuration(format!(
                        "unknown argument: {}",
                        flag
                    )))
                }
            }
            i += 1;
        }

        Ok(config)
    }

    /// Builds Huffman, arithmetic, BWT and LZ77 codecs, in that order.
    ///
    /// With no end marker configured, BWT is left out when every symbol value
    /// occurs in `input`. A configured marker that cannot be used is an error.
    pub fn build_algorithms<S: Symbol>(&self, input: &[S]) -> Result<Vec<Algorithm<S>>> {
        let arithmetic = match self.precision {
            Precision::Fixed(digits) => ArithmeticCodec::new(digits)?,
            Precision::Auto => ArithmeticCodec::sized_for(input),
        };
        let bwt = match self.end_marker {
            Some(ch) => Some(BwtCodec::new(S::from_char(ch).ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "end marker {:?} is not representable in {} mode",
                    ch, self.mode
                ))
            })?)),
            None => match BwtCodec::for_input(input) {
                Ok(codec) => Some(codec),
                Err(e) => {
                    warn!("BWT unavailable: {}", e);
                    None
                }
            },
        };

        let mut algorithms = vec![
            Algorithm::Huffman(HuffmanCodec),
            Algorithm::Arithmetic(arithmetic),
        ];
        algorithms.extend(bwt.map(Algorithm::Bwt));
        algorithms.push(Algorithm::Lz77(Lz77Codec::new(
            self.window_size,
            self.lookahead_size,
        )?));
        Ok(algorithms)
    }

    /// Print the configuration in human-readable form.
    pub fn print(&self) {
        println!("=== Configuration ===");
        match &self.input_file {
            Some(path) => println!("Input file: {} ({})", path.display(), self.mode),
            None => println!(
                "Input file: (generated sample, {} chars, seed {})",
                self.sample_len, self.seed
            ),
        }
        println!("Arithmetic precision: {}", self.precision);
        println!("LZ77 window: {}, lookahead: {}", self.window_size, self.lookahead_size);
        match self.end_marker {
            Some(ch) => println!("BWT end marker: {:?}", ch),
            None => println!("BWT end marker: (automatic)"),
        }
        if let Some(dir) = &self.artifact_dir {
            println!("Artifacts: {}", dir.display());
        }
        println!();
    }
}

pub fn print_help() {
    println!("codec-bench: Benchmark for lossless compression codecs");
    println!();
    println!("USAGE:");
    println!("    codec-bench [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --in <PATH>           Input file (default: generate sample)");
    println!("    --mode <MODE>         text or binary (default: text)");
    println!("    --seed <N>            Seed for the generated sample (default: 42)");
    println!("    --sample-len <N>      Length of the generated sample (default: 2000)");
    println!();
    println!("    --precision <N|auto>  Arithmetic coding digits (default: 50)");
    println!("    --window <N>          LZ77 search window (default: 100000)");
    println!("    --lookahead <N>       LZ77 lookahead (default: 100000)");
    println!("    --marker <CHAR>       BWT end marker (default: $)");
    println!();
    println!("    --artifacts <DIR>     Write encoded forms to DIR");
    println!("    --no-verify           Skip the round-trip check");
    println!("    --verbose, -v         Debug logging");
    println!("    --help, -h            Print this help");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cs::compression::Codec;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = BenchmarkConfig::from_args(&[]).unwrap();
        assert_eq!(config, BenchmarkConfig::default());
        assert_eq!(config.mode, DataMode::Text);
        assert_eq!(config.precision, Precision::Fixed(50));
        assert_eq!(config.window_size, 100_000);
        assert_eq!(config.lookahead_size, 100_000);
        assert_eq!(config.seed, 42);
        assert_eq!(config.sample_len, 2000);
        assert!(config.verify);
        assert!(config.artifact_dir.is_none());
    }

    #[test]
    fn test_parse_all_flags() {
        let config = BenchmarkConfig::from_args(&args(&[
            "--in", "data.bin", "--mode", "binary", "--precision", "auto", "--window", "64",
            "--lookahead", "16", "--marker", "#", "--seed", "7", "--sample-len", "10",
            "--artifacts", "out", "--no-verify", "--verbose",
        ]))
        .unwrap();
        assert_eq!(config.input_file, Some(PathBuf::from("data.bin")));
        assert_eq!(config.mode, DataMode::Binary);
        assert_eq!(config.precision, Precision::Auto);
        assert_eq!(config.window_size, 64);
        assert_eq!(config.lookahead_size, 16);
        assert_eq!(config.end_marker, Some('#'));
        assert_eq!(config.seed, 7);
        assert_eq!(config.sample_len, 10);
        assert_eq!(config.artifact_dir, Some(PathBuf::from("out")));
        assert!(!config.verify);
        assert!(config.verbose);
    }

    #[test]
    fn test_invalid_arguments() {
        for bad in [
            vec!["--bogus"],
            vec!["--window"],
            vec!["--window", "wide"],
            vec!["--precision", "-3"],
            vec!["--mode", "csv"],
            vec!["--marker", "ab"],
        ] {
            assert!(
                matches!(
                    BenchmarkConfig::from_args(&args(&bad)),
                    Err(Error::InvalidConfiguration(_))
                ),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_build_algorithms() {
        let input: Vec<char> = "price: $5".chars().collect();
        let algorithms = BenchmarkConfig::default().build_algorithms(&input).unwrap();
        let names: Vec<&str> = algorithms.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Huffman Coding", "Arithmetic Coding", "BWT", "LZ77"]);
        match &algorithms[2] {
            Algorithm::Bwt(codec) => assert_ne!(codec.end_marker(), '$'),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_build_algorithms_auto_precision() {
        let input: Vec<u8> = (0..=255u8).cycle().take(600).collect();
        let config = BenchmarkConfig {
            precision: Precision::Auto,
            ..BenchmarkConfig::default()
        };
        let algorithms = config.build_algorithms(&input).unwrap();
        match &algorithms[1] {
            Algorithm::Arithmetic(codec) => assert!(codec.precision() > 50),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_build_algorithms_without_free_marker() {
        let input: Vec<u8> = (0..=255u8).collect();
        let config = BenchmarkConfig {
            window_size: 64,
            lookahead_size: 16,
            ..BenchmarkConfig::default()
        };
        let algorithms = config.build_algorithms(&input).unwrap();
        let names: Vec<&str> = algorithms.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["Huffman Coding", "Arithmetic Coding", "LZ77"]);
        match &algorithms[2] {
            Algorithm::Lz77(codec) => {
                assert_eq!(codec.window_size(), 64);
                assert_eq!(codec.lookahead_size(), 16);
            }
            other => panic!("unexpected {:?}", other),
        }

        let config = BenchmarkConfig {
            end_marker: Some('$'),
            ..config
        };
        assert!(matches!(
            config.build_algorithms(&input),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_unrepresentable_marker() {
        let config = BenchmarkConfig {
            end_marker: Some('\u{2603}'),
            mode: DataMode::Binary,
            ..BenchmarkConfig::default()
        };
        assert!(matches!(
            config.build_algorithms(&[1u8, 2, 3]),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = BenchmarkConfig {
            window_size: 0,
            ..BenchmarkConfig::default()
        };
        assert!(config.build_algorithms(&['a']).is_err());
        let config = BenchmarkConfig {
            precision: Precision::Fixed(0),
            ..BenchmarkConfig::default()
        };
        assert!(config.build_algorithms(&['a']).is_err());
    }
}
