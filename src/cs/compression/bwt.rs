//! Burrows-Wheeler Transform implementation.
//!
//! The Burrows-Wheeler Transform (BWT) is a reversible transformation that rearranges
//! symbols in a way that makes the data more compressible. It's a key component of
//! the bzip2 compression algorithm.
//!
//! This codec appends a unique end marker before sorting, so the transformed
//! string is one symbol longer than the input and the original rotation is
//! always distinguishable.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{Codec, Symbol};
use crate::error::{Error, Result};

pub(crate) const NAME: &str = "BWT";

/// Bits charged for the original index.
const INDEX_BITS: usize = 32;

/// Compares the cyclic rotations of `text` starting at `a` and `b` without
/// materializing them.
fn compare_rotations<S: Ord>(text: &[S], a: usize, b: usize) -> Ordering {
    let rotation = |start: usize| text[start..].iter().chain(&text[..start]);
    rotation(a).cmp(rotation(b))
}

/// Rotation start indices of `text` in lexicographic order of the rotations.
pub fn sorted_rotations<S: Ord>(text: &[S]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..text.len()).collect();
    indices.sort_by(|&a, &b| compare_rotations(text, a, b));
    indices
}

/// Last-to-first mapping: for each position of `last`, the row of the sorted
/// first column holding the same symbol occurrence. Equal symbols keep their
/// occurrence order.
pub fn last_to_first<S: Symbol>(last: &[S]) -> Vec<usize> {
    // Count occurrences of each symbol, then the first row of each symbol.
    let mut counts: BTreeMap<S, usize> = BTreeMap::new();
    for &symbol in last {
        *counts.entry(symbol).or_insert(0) += 1;
    }
    let mut starts: BTreeMap<S, usize> = BTreeMap::new();
    let mut start = 0;
    for (&symbol, &count) in &counts {
        starts.insert(symbol, start);
        start += count;
    }

    let mut next = vec![0; last.len()];
    for (i, symbol) in last.iter().enumerate() {
        if let Some(row) = starts.get_mut(symbol) {
            next[i] = *row;
            *row += 1;
        }
    }
    next
}

/// Output of [`BwtCodec::compress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct BwtEncoded<S: Symbol> {
    /// Preceding symbol of each sorted rotation of `input + marker`.
    pub data: Vec<S>,
    /// Row of the unrotated string among the sorted rotations.
    pub original_index: usize,
}

impl<S: Symbol> BwtEncoded<S> {
    pub fn size_in_bits(&self) -> usize {
        if self.data.is_empty() {
            return 0;
        }
        self.data.iter().map(Symbol::bit_width).sum::<usize>() + INDEX_BITS
    }

    /// The transformed string and index as text, if the symbols are characters.
    pub fn as_text(&self) -> Option<String> {
        let text: Option<String> = self.data.iter().map(Symbol::as_char).collect();
        text.map(|text| format!("{}\n{}", text, self.original_index))
    }
}

/// Rotation-sorting transform with an in-band end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BwtCodec<S> {
    end_marker: S,
}

impl<S: Symbol> Default for BwtCodec<S> {
    fn default() -> Self {
        BwtCodec::new(S::default_end_marker())
    }
}

impl<S: Symbol> BwtCodec<S> {
    pub fn new(end_marker: S) -> Self {
        BwtCodec { end_marker }
    }

    /// Codec whose marker is the first candidate absent from `input`.
    pub fn for_input(input: &[S]) -> Result<Self> {
        let present: BTreeSet<S> = input.iter().copied().collect();
        S::marker_candidates()
            .into_iter()
            .find(|candidate| !present.contains(candidate))
            .map(BwtCodec::new)
            .ok_or_else(|| {
                Error::invalid_configuration("every end-marker candidate occurs in the input")
            })
    }

    pub fn end_marker(&self) -> S {
        self.end_marker
    }
}

impl<S: Symbol> Codec<S> for BwtCodec<S> {
    type Encoded = BwtEncoded<S>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, input: &[S]) -> Result<BwtEncoded<S>> {
        if input.is_empty() {
            return Ok(BwtEncoded {
                data: Vec::new(),
                original_index: 0,
            });
        }
        if input.contains(&self.end_marker) {
            return Err(Error::invalid_configuration(format!(
                "end marker {:?} occurs in the input",
                self.end_marker
            )));
        }

        let mut text = Vec::with_capacity(input.len() + 1);
        text.extend_from_slice(input);
        text.push(self.end_marker);
        let n = text.len();

        let rotations = sorted_rotations(&text);
        let original_index = rotations.iter().position(|&i| i == 0).unwrap_or(0);
        let data = rotations.iter().map(|&i| text[(i + n - 1) % n]).collect();
        debug!("bwt: {} rotations sorted, original index {}", n, original_index);

        Ok(BwtEncoded {
            data,
            original_index,
        })
    }

    fn decompress(&self, encoded: &BwtEncoded<S>) -> Result<Vec<S>> {
        let last = &encoded.data;
        if last.is_empty() {
            return Ok(Vec::new());
        }
        let n = last.len();
        if encoded.original_index >= n {
            return Err(Error::shape_mismatch(format!(
                "original index {} outside a transform of length {}",
                encoded.original_index, n
            )));
        }
        let markers = last.iter().filter(|&&s| s == self.end_marker).count();
        if markers != 1 {
            return Err(Error::shape_mismatch(format!(
                "expected exactly one end marker, found {}",
                markers
            )));
        }

        let next = last_to_first(last);
        let mut result = Vec::with_capacity(n - 1);
        let mut pos = encoded.original_index;
        for _ in 0..n - 1 {
            pos = next[pos];
            let symbol = last[pos];
            if symbol == self.end_marker {
                break;
            }
            result.push(symbol);
        }
        if result.len() != n - 1 {
            return Err(Error::shape_mismatch(format!(
                "end marker reached after {} of {} symbols",
                result.len(),
                n - 1
            )));
        }
        result.reverse();
        Ok(result)
    }

    fn encoded_size(&self, encoded: &BwtEncoded<S>) -> usize {
        encoded.size_in_bits()
    }
}
