//! Loading benchmark input from disk.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::info;

use crate::error::{Error, Result};

/// How a file is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataMode {
    /// UTF-8 text, coded character by character.
    #[default]
    Text,
    /// Raw bytes.
    Binary,
}

impl FromStr for DataMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(DataMode::Text),
            "binary" => Ok(DataMode::Binary),
            other => Err(Error::invalid_configuration(format!(
                "unsupported data mode {:?} (expected \"text\" or \"binary\")",
                other
            ))),
        }
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataMode::Text => f.write_str("text"),
            DataMode::Binary => f.write_str("binary"),
        }
    }
}

/// Raw benchmark input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dataset {
    Text(String),
    Binary(Vec<u8>),
}

impl Dataset {
    /// Number of symbols: characters for text, bytes for binary.
    pub fn len(&self) -> usize {
        match self {
            Dataset::Text(text) => text.chars().count(),
            Dataset::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Reads `path` in the given mode. Text must be valid UTF-8.
pub fn load_file<P: AsRef<Path>>(path: P, mode: DataMode) -> Result<Dataset> {
    let path = path.as_ref();
    let dataset = match mode {
        DataMode::Text => Dataset::Text(fs::read_to_string(path)?),
        DataMode::Binary => Dataset::Binary(fs::read(path)?),
    };
    info!(
        "loaded {} symbols from {} as {}",
        dataset.len(),
        path.display(),
        mode
    );
    Ok(dataset)
}
