//! Plain-text rendering of benchmark results.

use std::fmt::Write;

use crate::harness::tester::{BenchmarkResult, Verification};

const HEADERS: [&str; 7] = [
    "Algorithm",
    "Original size",
    "Encoded size",
    "Ratio",
    "Saving (bits)",
    "Time (s)",
    "Speed (KB/s)",
];

fn row(result: &BenchmarkResult) -> [String; 7] {
    [
        result.algorithm.to_string(),
        result.original_size.to_string(),
        result.encoded_size.to_string(),
        format!("{:.2}", result.compression_ratio),
        result.space_saving.to_string(),
        format!("{:.4}", result.encoding_time.as_secs_f64()),
        format!("{:.2}", result.encoding_speed / 1024.0),
    ]
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn render_row<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        // Writing to a String cannot fail.
        let _ = write!(line, " {:<width$} |", cell.as_ref(), width = width);
    }
    line
}

/// Grid table with one row per result, in the given order.
pub fn render_table(results: &[BenchmarkResult]) -> String {
    let rows: Vec<[String; 7]> = results.iter().map(row).collect();
    let widths: Vec<usize> = (0..HEADERS.len())
        .map(|column| {
            rows.iter()
                .map(|r| r[column].chars().count())
                .chain(std::iter::once(HEADERS[column].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let rule = separator(&widths);
    let mut lines = vec![rule.clone(), render_row(&HEADERS, &widths), rule.clone()];
    for r in &rows {
        lines.push(render_row(r, &widths));
        lines.push(rule.clone());
    }
    lines.join("\n")
}

/// One line per algorithm stating whether it round-tripped.
pub fn render_verification(verifications: &[Verification]) -> String {
    verifications
        .iter()
        .map(|v| {
            let status = if v.round_trip { "ok" } else { "MISMATCH" };
            if v.precision_exhausted {
                format!("{}: {} (precision exhausted)", v.algorithm, status)
            } else {
                format!("{}: {}", v.algorithm, status)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn result(name: &'static str, encoded: usize) -> BenchmarkResult {
        BenchmarkResult {
            algorithm: name,
            original_size: 80,
            encoded_size: encoded,
            compression_ratio: (80.0 - encoded as f64) / 80.0,
            space_saving: 80 - encoded as i64,
            encoding_time: Duration::from_millis(500),
            encoding_speed: 160.0,
            artifact: None,
        }
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&[result("LZ77", 40), result("BWT", 120)]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[1].starts_with("| Algorithm |"));
        assert!(lines[3].starts_with("| LZ77      | 80            | 40           | 0.50  | 40"));
        assert!(lines[5].contains("| -0.50 |"));
        assert!(lines[5].contains("| 0.5000   |"));
        assert!(lines[5].contains("| 0.16         |"));
        // Every line has the same width.
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn test_render_verification() {
        let text = render_verification(&[
            Verification {
                algorithm: "Huffman Coding",
                round_trip: true,
                precision_exhausted: false,
            },
            Verification {
                algorithm: "Arithmetic Coding",
                round_trip: false,
                precision_exhausted: true,
            },
        ]);
        assert_eq!(
            text,
            "Huffman Coding: ok\nArithmetic Coding: MISMATCH (precision exhausted)"
        );
    }
}
