use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::{Codec, Symbol};
use crate::error::{Error, Result};

pub(crate) const NAME: &str = "Huffman Coding";

/// Represents a node in the Huffman tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanNode<S> {
    /// A leaf node contains a symbol and its frequency.
    Leaf { symbol: S, freq: usize },
    /// An internal node with left and right children and combined frequency.
    Internal {
        freq: usize,
        left: Box<HuffmanNode<S>>,
        right: Box<HuffmanNode<S>>,
    },
}

impl<S> HuffmanNode<S> {
    /// Returns the frequency of the node.
    pub fn freq(&self) -> usize {
        match self {
            HuffmanNode::Leaf { freq, .. } => *freq,
            HuffmanNode::Internal { freq, .. } => *freq,
        }
    }
}

/// Secondary sort key: leaves by symbol value, then internal nodes in the
/// order they were created.
///
/// Any deterministic order yields an optimal code. Heaps that order equal
/// frequencies differently assign different codes with the same lengths: for
/// "aaabbbcccdddeeefff" this order gives `a = 100` where a plain binary-heap
/// order can give `a = 110`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TieBreak<S> {
    Leaf(S),
    Internal(usize),
}

/// A helper wrapper for HuffmanNode for use in a BinaryHeap.
/// We want the node with the smallest (frequency, tie-break) to have highest priority.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeWrapper<S> {
    node: Box<HuffmanNode<S>>,
    tie: TieBreak<S>,
}

impl<S: Ord> Ord for NodeWrapper<S> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower frequency should come first.
        other
            .node
            .freq()
            .cmp(&self.node.freq())
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

impl<S: Ord> PartialOrd for NodeWrapper<S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build a frequency table mapping each symbol in `input` to its count.
pub fn build_frequency_table<S: Symbol>(input: &[S]) -> BTreeMap<S, usize> {
    let mut freq = BTreeMap::new();
    for &symbol in input {
        *freq.entry(symbol).or_insert(0) += 1;
    }
    freq
}

/// Build the Huffman tree given a frequency table.
/// Returns `None` if the frequency table is empty.
pub fn build_huffman_tree<S: Symbol>(
    freq_table: &BTreeMap<S, usize>,
) -> Option<Box<HuffmanNode<S>>> {
    let mut heap = BinaryHeap::with_capacity(freq_table.len());
    for (&symbol, &freq) in freq_table {
        heap.push(NodeWrapper {
            node: Box::new(HuffmanNode::Leaf { symbol, freq }),
            tie: TieBreak::Leaf(symbol),
        });
    }

    let mut created = 0;
    loop {
        let left = heap.pop()?;
        let Some(right) = heap.pop() else {
            return Some(left.node);
        };
        let freq = left.node.freq() + right.node.freq();
        heap.push(NodeWrapper {
            node: Box::new(HuffmanNode::Internal {
                freq,
                left: left.node,
                right: right.node,
            }),
            tie: TieBreak::Internal(created),
        });
        created += 1;
    }
}

/// Recursively build the code table mapping symbols to their Huffman codes.
///
/// If the tree consists of a single leaf (i.e. one unique symbol), the code "0" is assigned.
pub fn build_code_table<S: Symbol>(node: &HuffmanNode<S>) -> BTreeMap<S, String> {
    let mut table = BTreeMap::new();
    build_code_table_helper(node, String::new(), &mut table);
    table
}

fn build_code_table_helper<S: Symbol>(
    node: &HuffmanNode<S>,
    prefix: String,
    table: &mut BTreeMap<S, String>,
) {
    match node {
        HuffmanNode::Leaf { symbol, .. } => {
            let code = if prefix.is_empty() {
                "0".to_string()
            } else {
                prefix
            };
            table.insert(*symbol, code);
        }
        HuffmanNode::Internal { left, right, .. } => {
            let mut left_prefix = prefix.clone();
            left_prefix.push('0');
            build_code_table_helper(left, left_prefix, table);
            let mut right_prefix = prefix;
            right_prefix.push('1');
            build_code_table_helper(right, right_prefix, table);
        }
    }
}

/// Encode the input using the provided code table.
/// Each symbol is replaced with its Huffman code.
pub fn encode<S: Symbol>(input: &[S], code_table: &BTreeMap<S, String>) -> Result<String> {
    let mut bits = String::new();
    for symbol in input {
        let code = code_table.get(symbol).ok_or_else(|| {
            Error::invalid_configuration(format!("no Huffman code for symbol {:?}", symbol))
        })?;
        bits.push_str(code);
    }
    Ok(bits)
}

/// Decode `original_length` symbols from a bitstring using a code table.
///
/// The inverse table is rebuilt on every call. Bits are consumed greedily
/// into a running prefix that is emitted and reset whenever it matches a code.
/// Bits after the last expected symbol are ignored.
pub fn decode<S: Symbol>(
    encoded: &str,
    code_table: &BTreeMap<S, String>,
    original_length: usize,
) -> Result<Vec<S>> {
    let reverse: HashMap<&str, S> = code_table
        .iter()
        .map(|(symbol, code)| (code.as_str(), *symbol))
        .collect();
    let longest = code_table.values().map(String::len).max().unwrap_or(0);

    let mut result = Vec::with_capacity(original_length);
    let mut current = String::with_capacity(longest);
    for (position, bit) in encoded.chars().enumerate() {
        if result.len() == original_length {
            break;
        }
        if bit != '0' && bit != '1' {
            return Err(Error::shape_mismatch(format!(
                "invalid bit {:?} at position {}",
                bit, position
            )));
        }
        current.push(bit);
        if let Some(&symbol) = reverse.get(current.as_str()) {
            result.push(symbol);
            current.clear();
        } else if current.len() >= longest {
            return Err(Error::shape_mismatch(format!(
                "no Huffman code matches the bits ending at position {}",
                position
            )));
        }
    }

    if result.len() < original_length {
        return Err(Error::shape_mismatch(format!(
            "bitstream exhausted after {} of {} symbols",
            result.len(),
            original_length
        )));
    }
    Ok(result)
}

/// Indented depth-first rendering of a tree, left subtrees first.
pub fn tree_structure<S: Symbol>(tree: &HuffmanNode<S>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut stack = vec![(tree, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        match node {
            HuffmanNode::Leaf { symbol, freq } => {
                lines.push(format!("{}{:?} (freq: {})", indent, symbol, freq));
            }
            HuffmanNode::Internal { freq, left, right } => {
                lines.push(format!("{}Internal (freq: {})", indent, freq));
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }
    lines
}

/// Output of [`HuffmanCodec::compress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct HuffmanEncoded<S: Symbol> {
    /// Concatenated codes as '0'/'1' characters.
    pub bits: String,
    pub codes: BTreeMap<S, String>,
    pub original_length: usize,
}

impl<S: Symbol> HuffmanEncoded<S> {
    /// One bit per bitstring character; the code table is not counted.
    pub fn size_in_bits(&self) -> usize {
        self.bits.len()
    }
}

/// Frequency-driven prefix coder producing '0'/'1' bitstrings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HuffmanCodec;

impl<S: Symbol> Codec<S> for HuffmanCodec {
    type Encoded = HuffmanEncoded<S>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, input: &[S]) -> Result<HuffmanEncoded<S>> {
        if input.is_empty() {
            return Ok(HuffmanEncoded {
                bits: String::new(),
                codes: BTreeMap::new(),
                original_length: 0,
            });
        }

        let freq_table = build_frequency_table(input);
        if freq_table.len() == 1 {
            let codes: BTreeMap<S, String> =
                freq_table.keys().map(|&symbol| (symbol, "0".to_string())).collect();
            return Ok(HuffmanEncoded {
                bits: "0".repeat(input.len()),
                codes,
                original_length: input.len(),
            });
        }

        let tree = build_huffman_tree(&freq_table).ok_or_else(|| {
            Error::invalid_configuration("cannot build a Huffman tree without symbols")
        })?;
        let codes = build_code_table(&tree);
        debug!(
            "huffman: {} symbols, {} distinct, longest code {} bits",
            input.len(),
            codes.len(),
            codes.values().map(String::len).max().unwrap_or(0)
        );
        let bits = encode(input, &codes)?;
        trace!("huffman: encoded {} bits", bits.len());

        Ok(HuffmanEncoded {
            bits,
            codes,
            original_length: input.len(),
        })
    }

    fn decompress(&self, encoded: &HuffmanEncoded<S>) -> Result<Vec<S>> {
        if encoded.original_length == 0 {
            return Ok(Vec::new());
        }
        let mut symbols = encoded.codes.keys();
        match (symbols.next(), symbols.next()) {
            (None, _) => Err(Error::invalid_configuration(
                "empty Huffman code table for a non-empty message",
            )),
            (Some(&symbol), None) => Ok(vec![symbol; encoded.original_length]),
            _ => decode(&encoded.bits, &encoded.codes, encoded.original_length),
        }
    }

    fn encoded_size(&self, encoded: &HuffmanEncoded<S>) -> usize {
        encoded.size_in_bits()
    }
}
