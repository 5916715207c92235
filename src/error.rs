//! Error types shared by the codecs and the benchmark harness.

use thiserror::Error;

/// Every failure the crate can report.
///
/// Degenerate inputs (empty, one distinct symbol) are never errors; each codec
/// short-circuits them explicitly.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoded form disagrees with its declared length or alphabet,
    /// e.g. the bitstream runs out before the expected symbol count.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The decimal precision is too small for the message, so the coding
    /// interval collapsed.
    #[error("precision overflow: {digits} significant digits cannot resolve symbol {position}")]
    PrecisionOverflow { digits: usize, position: usize },

    /// Unsupported settings, e.g. an unknown data mode or an end marker that
    /// occurs in the input.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// File system failure while loading data or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A saved encoded form could not be written or read back.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn shape_mismatch<S: Into<String>>(message: S) -> Self {
        Error::ShapeMismatch(message.into())
    }

    pub fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Error::InvalidConfiguration(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
