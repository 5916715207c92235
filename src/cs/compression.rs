//! Compression algorithms implementation.
//!
//! This module provides four lossless codecs behind one contract so they can be
//! benchmarked interchangeably:
//! - Huffman coding (prefix-code bitstrings)
//! - Arithmetic coding (a single arbitrary-precision decimal fraction)
//! - Burrows-Wheeler transform (rotation-sorted permutation plus an index)
//! - LZ77 (sliding-window `(offset, length, literal)` triples)
//!
//! Every codec is an immutable configuration value. Trees, tables and buffers
//! are built fresh inside each call, so a codec can be shared across threads.
//!
//! # Examples
//!
//! ```rust
//! use codec_bench::cs::compression::{Algorithm, Codec};
//!
//! let input: Vec<char> = "abracadabra".chars().collect();
//! for algorithm in Algorithm::defaults_for(&input).unwrap() {
//!     let encoded = algorithm.compress(&input).unwrap();
//!     assert_eq!(algorithm.decompress(&encoded).unwrap(), input);
//! }
//! ```

use std::fmt::Debug;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use crate::error::{Error, Result};

pub mod arithmetic;
pub mod bwt;
pub mod decimal;
pub mod huffman;
pub mod lz77;

pub use arithmetic::{ArithmeticCodec, ArithmeticEncoded, CumulativeTable, DecodeReport};
pub use bwt::{BwtCodec, BwtEncoded};
pub use decimal::{Decimal, DecimalContext};
pub use huffman::{
    build_code_table, build_frequency_table, build_huffman_tree, decode, encode, HuffmanCodec,
    HuffmanEncoded, HuffmanNode,
};
pub use lz77::{Lz77Codec, Token};

/// An atomic unit of input: a byte in binary mode, a character in text mode.
pub trait Symbol:
    Copy + Ord + Hash + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Width of the symbol in the raw input, in bits.
    fn bit_width(&self) -> usize;

    /// The BWT end marker used when none is configured.
    fn default_end_marker() -> Self;

    /// End markers to try, in order, when the default occurs in the input.
    fn marker_candidates() -> Vec<Self>;

    /// Converts a configured character (e.g. a command-line marker).
    fn from_char(ch: char) -> Option<Self>;

    /// The symbol as text, if the symbol type is natively textual.
    fn as_char(&self) -> Option<char>;
}

impl Symbol for u8 {
    fn bit_width(&self) -> usize {
        8
    }

    fn default_end_marker() -> Self {
        b'$'
    }

    fn marker_candidates() -> Vec<Self> {
        let mut candidates = vec![b'$'];
        candidates.extend((0..=u8::MAX).filter(|&b| b != b'$'));
        candidates
    }

    fn from_char(ch: char) -> Option<Self> {
        u8::try_from(ch).ok()
    }

    fn as_char(&self) -> Option<char> {
        None
    }
}

impl Symbol for char {
    fn bit_width(&self) -> usize {
        8 * self.len_utf8()
    }

    fn default_end_marker() -> Self {
        '$'
    }

    fn marker_candidates() -> Vec<Self> {
        // '$' first, then ASCII control characters, then a private-use block.
        let mut candidates = vec!['$'];
        candidates.extend((0u32..0x20).filter_map(char::from_u32));
        candidates.extend((0xE000u32..0xF900).filter_map(char::from_u32));
        candidates
    }

    fn from_char(ch: char) -> Option<Self> {
        Some(ch)
    }

    fn as_char(&self) -> Option<char> {
        Some(*self)
    }
}

/// Total width of `input` in bits.
pub fn original_bits<S: Symbol>(input: &[S]) -> usize {
    input.iter().map(Symbol::bit_width).sum()
}

/// Trait for compression algorithms.
pub trait Codec<S: Symbol> {
    /// The complete result of one `compress` call.
    type Encoded;

    /// Human-readable algorithm name.
    fn name(&self) -> &'static str;

    /// Compress the input. The result is complete or the call fails.
    fn compress(&self, input: &[S]) -> Result<Self::Encoded>;

    /// Reproduce the exact input from an encoded form.
    fn decompress(&self, encoded: &Self::Encoded) -> Result<Vec<S>>;

    /// Size of an encoded form in bits; comparable across codecs but not a
    /// wire size.
    fn encoded_size(&self, encoded: &Self::Encoded) -> usize;
}

/// The closed set of codecs the harness composes.
#[derive(Debug, Clone)]
pub enum Algorithm<S: Symbol> {
    Huffman(HuffmanCodec),
    Arithmetic(ArithmeticCodec),
    Bwt(BwtCodec<S>),
    Lz77(Lz77Codec),
}

/// The encoded form of any [`Algorithm`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub enum EncodedForm<S: Symbol> {
    Huffman(HuffmanEncoded<S>),
    Arithmetic(ArithmeticEncoded<S>),
    Bwt(BwtEncoded<S>),
    Lz77(Vec<Token<S>>),
}

impl<S: Symbol> Algorithm<S> {
    /// All four codecs with default settings and a BWT marker absent from `input`.
    pub fn defaults_for(input: &[S]) -> Result<Vec<Self>> {
        Ok(vec![
            Algorithm::Huffman(HuffmanCodec),
            Algorithm::Arithmetic(ArithmeticCodec::default()),
            Algorithm::Bwt(BwtCodec::for_input(input)?),
            Algorithm::Lz77(Lz77Codec::default()),
        ])
    }

    /// Short name used for artifact file names.
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Algorithm::Huffman(_) => "Huffman",
            Algorithm::Arithmetic(_) => "Arithmetic",
            Algorithm::Bwt(_) => "BWT",
            Algorithm::Lz77(_) => "LZ77",
        }
    }

    /// Compresses `input` and saves the complete encoded form to `path`.
    pub fn compress_to_file<P: AsRef<Path>>(&self, input: &[S], path: P) -> Result<EncodedForm<S>> {
        let encoded = self.compress(input)?;
        encoded.save(path)?;
        Ok(encoded)
    }

    /// Loads an encoded form saved by [`Algorithm::compress_to_file`] and
    /// decodes it.
    pub fn decompress_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<S>> {
        self.decompress(&EncodedForm::load(path)?)
    }
}

fn variant_mismatch<S: Symbol>(expected: &'static str, found: &EncodedForm<S>) -> Error {
    Error::shape_mismatch(format!(
        "{} cannot decode a {} encoded form",
        expected,
        found.algorithm_name()
    ))
}

impl<S: Symbol> Codec<S> for Algorithm<S> {
    type Encoded = EncodedForm<S>;

    fn name(&self) -> &'static str {
        match self {
            Algorithm::Huffman(_) => huffman::NAME,
            Algorithm::Arithmetic(_) => arithmetic::NAME,
            Algorithm::Bwt(_) => bwt::NAME,
            Algorithm::Lz77(_) => lz77::NAME,
        }
    }

    fn compress(&self, input: &[S]) -> Result<EncodedForm<S>> {
        Ok(match self {
            Algorithm::Huffman(codec) => EncodedForm::Huffman(codec.compress(input)?),
            Algorithm::Arithmetic(codec) => EncodedForm::Arithmetic(codec.compress(input)?),
            Algorithm::Bwt(codec) => EncodedForm::Bwt(codec.compress(input)?),
            Algorithm::Lz77(codec) => EncodedForm::Lz77(codec.compress(input)?),
        })
    }

    fn decompress(&self, encoded: &EncodedForm<S>) -> Result<Vec<S>> {
        match (self, encoded) {
            (Algorithm::Huffman(codec), EncodedForm::Huffman(form)) => codec.decompress(form),
            (Algorithm::Arithmetic(codec), EncodedForm::Arithmetic(form)) => {
                codec.decompress(form)
            }
            (Algorithm::Bwt(codec), EncodedForm::Bwt(form)) => codec.decompress(form),
            (Algorithm::Lz77(codec), EncodedForm::Lz77(tokens)) => codec.decompress(tokens),
            (algorithm, form) => Err(variant_mismatch(algorithm.name(), form)),
        }
    }

    fn encoded_size(&self, encoded: &EncodedForm<S>) -> usize {
        // The size metric depends only on the form itself.
        encoded.size_in_bits()
    }
}

/// Inspection artifact for an encoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// The form is natively textual.
    Text(String),
    /// Serialized bytes, written hex-encoded.
    Blob(Vec<u8>),
}

impl Artifact {
    pub fn extension(&self) -> &'static str {
        match self {
            Artifact::Text(_) => "txt",
            Artifact::Blob(_) => "hex",
        }
    }

    /// The contents as written to disk.
    pub fn contents(&self) -> String {
        match self {
            Artifact::Text(text) => text.clone(),
            Artifact::Blob(bytes) => hex::encode(bytes),
        }
    }
}

impl<S: Symbol> EncodedForm<S> {
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            EncodedForm::Huffman(_) => huffman::NAME,
            EncodedForm::Arithmetic(_) => arithmetic::NAME,
            EncodedForm::Bwt(_) => bwt::NAME,
            EncodedForm::Lz77(_) => lz77::NAME,
        }
    }

    pub fn size_in_bits(&self) -> usize {
        match self {
            EncodedForm::Huffman(form) => form.size_in_bits(),
            EncodedForm::Arithmetic(form) => form.size_in_bits(),
            EncodedForm::Bwt(form) => form.size_in_bits(),
            EncodedForm::Lz77(tokens) => lz77::size_in_bits(tokens),
        }
    }

    /// Textual artifact when the form is natively textual, the serialized
    /// form otherwise.
    pub fn artifact(&self) -> Result<Artifact> {
        Ok(match self {
            EncodedForm::Huffman(form) => Artifact::Text(form.bits.clone()),
            EncodedForm::Bwt(form) => match form.as_text() {
                Some(text) => Artifact::Text(text),
                None => Artifact::Blob(serde_json::to_vec(self)?),
            },
            EncodedForm::Arithmetic(_) | EncodedForm::Lz77(_) => {
                Artifact::Blob(serde_json::to_vec(self)?)
            }
        })
    }

    /// Writes the complete form, code tables and lengths included, as JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a form written by [`EncodedForm::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
