//! Runs registered codecs over one input and collects metrics.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::cs::compression::{original_bits, Algorithm, Codec, EncodedForm, Symbol};
use crate::error::Result;
use crate::harness::metrics;

/// Metrics for one algorithm on one input.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    pub algorithm: &'static str,
    pub original_size: usize,
    pub encoded_size: usize,
    pub compression_ratio: f64,
    pub space_saving: i64,
    pub encoding_time: Duration,
    /// Bits per second.
    pub encoding_speed: f64,
    /// Where the encoded form was written, if artifacts are enabled.
    pub artifact: Option<PathBuf>,
}

/// Round-trip check for one algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub algorithm: &'static str,
    pub round_trip: bool,
    /// Arithmetic decoding fell back to the last interval at least once.
    pub precision_exhausted: bool,
}

/// Registers algorithms and benchmarks them against one input.
#[derive(Debug, Clone)]
pub struct CompressionTester<S: Symbol> {
    algorithms: Vec<Algorithm<S>>,
    artifact_dir: Option<PathBuf>,
}

impl<S: Symbol> Default for CompressionTester<S> {
    fn default() -> Self {
        CompressionTester {
            algorithms: Vec::new(),
            artifact_dir: None,
        }
    }
}

impl<S: Symbol> CompressionTester<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes each encoded form to `<dir>/<Name>_compressed.{txt,hex}`.
    pub fn with_artifact_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    pub fn add_algorithm(&mut self, algorithm: Algorithm<S>) {
        self.algorithms.push(algorithm);
    }

    pub fn algorithms(&self) -> &[Algorithm<S>] {
        &self.algorithms
    }

    /// Compresses `input` once per algorithm, in registration order.
    pub fn run(&self, input: &[S]) -> Result<Vec<BenchmarkResult>> {
        if let Some(dir) = &self.artifact_dir {
            fs::create_dir_all(dir)?;
        }
        self.algorithms
            .iter()
            .map(|algorithm| self.run_single(algorithm, input))
            .collect()
    }

    fn run_single(&self, algorithm: &Algorithm<S>, input: &[S]) -> Result<BenchmarkResult> {
        let original_size = original_bits(input);

        let start = Instant::now();
        let encoded = algorithm.compress(input)?;
        let encoding_time = start.elapsed();

        let encoded_size = algorithm.encoded_size(&encoded);
        debug!(
            "{}: {} -> {} bits in {:?}",
            algorithm.name(),
            original_size,
            encoded_size,
            encoding_time
        );

        let artifact = match &self.artifact_dir {
            Some(dir) => Some(write_artifact(dir, algorithm, &encoded)?),
            None => None,
        };

        Ok(BenchmarkResult {
            algorithm: algorithm.name(),
            original_size,
            encoded_size,
            compression_ratio: metrics::compression_ratio(original_size, encoded_size),
            space_saving: metrics::space_saving(original_size, encoded_size),
            encoding_time,
            encoding_speed: metrics::encoding_speed(original_size, encoding_time.as_secs_f64()),
            artifact,
        })
    }

    /// Checks that every algorithm reproduces `input`. Codecs hold no working
    /// state, so the checks run in parallel. Decoding errors abort the check.
    pub fn verify(&self, input: &[S]) -> Result<Vec<Verification>> {
        self.algorithms
            .par_iter()
            .map(|algorithm| verify_single(algorithm, input))
            .collect()
    }
}

fn verify_single<S: Symbol>(algorithm: &Algorithm<S>, input: &[S]) -> Result<Verification> {
    let encoded = algorithm.compress(input)?;
    let (decoded, precision_exhausted) = match (algorithm, &encoded) {
        (Algorithm::Arithmetic(codec), EncodedForm::Arithmetic(form)) => {
            let report = codec.decompress_with_report(form)?;
            let exhausted = report.precision_exhausted();
            (report.symbols, exhausted)
        }
        _ => (algorithm.decompress(&encoded)?, false),
    };
    let round_trip = decoded == input;
    if !round_trip {
        warn!("{}: decoded output differs from the input", algorithm.name());
    }
    Ok(Verification {
        algorithm: algorithm.name(),
        round_trip,
        precision_exhausted,
    })
}

fn write_artifact<S: Symbol>(
    dir: &Path,
    algorithm: &Algorithm<S>,
    encoded: &EncodedForm<S>,
) -> Result<PathBuf> {
    let artifact = encoded.artifact()?;
    let path = dir.join(format!(
        "{}_compressed.{}",
        algorithm.artifact_stem(),
        artifact.extension()
    ));
    fs::write(&path, artifact.contents())?;
    info!("{}: wrote {}", algorithm.name(), path.display());
    Ok(path)
}
