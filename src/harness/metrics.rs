//! Efficiency metrics derived from reported sizes and timings.

use std::collections::HashMap;

use crate::cs::compression::Symbol;

/// `(original - encoded) / original`; zero for an empty original.
pub fn compression_ratio(original_bits: usize, encoded_bits: usize) -> f64 {
    if original_bits == 0 {
        return 0.0;
    }
    (original_bits as f64 - encoded_bits as f64) / original_bits as f64
}

/// `original - encoded`; negative when the encoding is larger.
pub fn space_saving(original_bits: usize, encoded_bits: usize) -> i64 {
    original_bits as i64 - encoded_bits as i64
}

/// Bits per second; zero when no time was measured.
pub fn encoding_speed(original_bits: usize, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    original_bits as f64 / seconds
}

/// Shannon entropy in bits per symbol, the lower bound for any symbol code.
pub fn entropy<S: Symbol>(input: &[S]) -> f64 {
    if input.is_empty() {
        return 0.0;
    }
    let mut counts: HashMap<S, usize> = HashMap::new();
    for &symbol in input {
        *counts.entry(symbol).or_insert(0) += 1;
    }
    let total = input.len() as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}
