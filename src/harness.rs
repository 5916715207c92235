//! Benchmark harness: loads or generates input, runs every codec over it and
//! reports size, ratio and speed.
//!
//! ```
//! use codec_bench::harness::{run_benchmark, BenchmarkConfig};
//!
//! let input: Vec<char> = "abracadabra".chars().collect();
//! let outcome = run_benchmark(&BenchmarkConfig::default(), &input).unwrap();
//! assert_eq!(outcome.results.len(), 4);
//! assert!(outcome.verifications.iter().all(|v| v.round_trip));
//! ```

pub mod config;
pub mod loader;
pub mod metrics;
pub mod report;
pub mod sample;
pub mod tester;

pub use config::{BenchmarkConfig, Precision};
pub use loader::{load_file, DataMode, Dataset};
pub use report::{render_table, render_verification};
pub use sample::generate_sample_text;
pub use tester::{BenchmarkResult, CompressionTester, Verification};

use log::info;

use crate::cs::compression::Symbol;
use crate::error::Result;

/// Everything one benchmark run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkOutcome {
    pub results: Vec<BenchmarkResult>,
    /// Empty when verification is disabled.
    pub verifications: Vec<Verification>,
    /// Shannon entropy of the input in bits per symbol.
    pub entropy: f64,
}

/// Runs the configured codecs over `input`, then verifies them if enabled.
pub fn run_benchmark<S: Symbol>(config: &BenchmarkConfig, input: &[S]) -> Result<BenchmarkOutcome> {
    let mut tester = CompressionTester::new();
    if let Some(dir) = &config.artifact_dir {
        tester = tester.with_artifact_dir(dir);
    }
    for algorithm in config.build_algorithms(input)? {
        tester.add_algorithm(algorithm);
    }

    info!(
        "benchmarking {} codecs over {} symbols",
        tester.algorithms().len(),
        input.len()
    );
    let results = tester.run(input)?;
    let verifications = if config.verify {
        tester.verify(input)?
    } else {
        Vec::new()
    };

    Ok(BenchmarkOutcome {
        results,
        verifications,
        entropy: metrics::entropy(input),
    })
}
