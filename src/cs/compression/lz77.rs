use log::debug;
use serde::{Deserialize, Serialize};

use super::{Codec, Symbol};
use crate::error::{Error, Result};

pub(crate) const NAME: &str = "LZ77";

/// Default search window, large enough to disable windowing for small inputs.
pub const DEFAULT_WINDOW_SIZE: usize = 100_000;

/// Default maximum match length.
pub const DEFAULT_LOOKAHEAD_SIZE: usize = 100_000;

/// An LZ77 token.
///
/// When a match is found, the token is:
///   (offset, length, next)
///
/// If no match is found, then offset and length are zero, and `next` is the literal.
/// `next` is `None` only when a match runs to the end of the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token<S> {
    pub offset: usize,
    pub length: usize,
    pub next: Option<S>,
}

impl<S> Token<S> {
    pub fn literal(symbol: S) -> Self {
        Token {
            offset: 0,
            length: 0,
            next: Some(symbol),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.offset == 0 && self.length == 0
    }
}

/// Find the longest match for `input[i..]` among the `window_size` symbols
/// before `i`.
///
/// Candidates are scanned from the start of the search buffer towards `i`, and
/// only a strictly longer match replaces the best one, so ties go to the
/// earliest start (the largest offset). A match never extends past `i`.
///
/// Returns `(offset, length)`, or `(0, 0)` when nothing matches.
pub fn find_longest_match<S: Symbol>(
    input: &[S],
    i: usize,
    window_size: usize,
    lookahead_size: usize,
) -> (usize, usize) {
    let search_start = i.saturating_sub(window_size);
    let max_length = lookahead_size.min(input.len() - i);
    let mut best_length = 0;
    let mut best_offset = 0;
    for j in search_start..i {
        let mut length = 0;
        // Compare input[j..] with input[i..] until mismatch, end of input,
        // reaching the lookahead buffer limit, or leaving the search buffer.
        while length < max_length && j + length < i && input[j + length] == input[i + length] {
            length += 1;
        }
        if length > best_length {
            best_length = length;
            best_offset = i - j;
            if best_length == max_length {
                break;
            }
        }
    }
    (best_offset, best_length)
}

/// Bit length of `value`, at least one.
fn bit_length(value: usize) -> usize {
    ((usize::BITS - value.leading_zeros()) as usize).max(1)
}

/// Per token: bits for the largest offset, bits for the largest length, and
/// the literal width (8 bits when absent).
pub fn size_in_bits<S: Symbol>(tokens: &[Token<S>]) -> usize {
    if tokens.is_empty() {
        return 0;
    }
    let offset_bits = bit_length(tokens.iter().map(|t| t.offset).max().unwrap_or(0));
    let length_bits = bit_length(tokens.iter().map(|t| t.length).max().unwrap_or(0));
    tokens
        .iter()
        .map(|t| offset_bits + length_bits + t.next.map_or(8, |s| s.bit_width()))
        .sum()
}

/// Sliding-window compressor producing `(offset, length, literal)` triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Codec {
    window_size: usize,
    lookahead_size: usize,
}

impl Default for Lz77Codec {
    fn default() -> Self {
        Lz77Codec {
            window_size: DEFAULT_WINDOW_SIZE,
            lookahead_size: DEFAULT_LOOKAHEAD_SIZE,
        }
    }
}

impl Lz77Codec {
    /// # Parameters
    ///
    /// - `window_size`: the maximum number of previous symbols to search for a match.
    /// - `lookahead_size`: the maximum match length to consider.
    pub fn new(window_size: usize, lookahead_size: usize) -> Result<Self> {
        if window_size == 0 || lookahead_size == 0 {
            return Err(Error::invalid_configuration(format!(
                "LZ77 window ({}) and lookahead ({}) must be positive",
                window_size, lookahead_size
            )));
        }
        Ok(Lz77Codec {
            window_size,
            lookahead_size,
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn lookahead_size(&self) -> usize {
        self.lookahead_size
    }
}

impl<S: Symbol> Codec<S> for Lz77Codec {
    type Encoded = Vec<Token<S>>;

    fn name(&self) -> &'static str {
        NAME
    }

    /// # Example
    ///
    /// ```
    /// use codec_bench::cs::compression::{Codec, Lz77Codec};
    ///
    /// let data = b"abracadabra abracadabra";
    /// let codec = Lz77Codec::new(16, 8).unwrap();
    /// let tokens = codec.compress(data).unwrap();
    /// assert!(!tokens.is_empty());
    /// ```
    fn compress(&self, input: &[S]) -> Result<Vec<Token<S>>> {
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < input.len() {
            let (offset, length) =
                find_longest_match(input, i, self.window_size, self.lookahead_size);
            if length > 0 {
                // If the match reaches to the end, then next is None.
                tokens.push(Token {
                    offset,
                    length,
                    next: input.get(i + length).copied(),
                });
                i += length + 1;
            } else {
                tokens.push(Token::literal(input[i]));
                i += 1;
            }
        }
        debug!(
            "lz77: {} symbols into {} tokens ({} literal)",
            input.len(),
            tokens.len(),
            tokens.iter().filter(|t| t.is_literal()).count()
        );
        Ok(tokens)
    }

    /// Replays tokens against the growing output. Copies run symbol by symbol,
    /// so a back-reference may overlap the symbols it produces.
    ///
    /// # Example
    ///
    /// ```
    /// use codec_bench::cs::compression::{Codec, Lz77Codec};
    ///
    /// let data = b"abracadabra abracadabra";
    /// let codec = Lz77Codec::new(16, 8).unwrap();
    /// let tokens = codec.compress(data).unwrap();
    /// let decompressed = codec.decompress(&tokens).unwrap();
    /// assert_eq!(decompressed, data);
    /// ```
    fn decompress(&self, tokens: &Vec<Token<S>>) -> Result<Vec<S>> {
        let mut output = Vec::new();
        for (index, token) in tokens.iter().enumerate() {
            if token.offset > 0 && token.length > 0 {
                if token.offset > output.len() {
                    return Err(Error::shape_mismatch(format!(
                        "token {} refers {} symbols back with only {} produced",
                        index,
                        token.offset,
                        output.len()
                    )));
                }
                let start = output.len() - token.offset;
                for k in 0..token.length {
                    output.push(output[start + k]);
                }
            }
            // Append the literal (if present).
            if let Some(symbol) = token.next {
                output.push(symbol);
            }
        }
        Ok(output)
    }

    fn encoded_size(&self, tokens: &Vec<Token<S>>) -> usize {
        size_in_bits(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_empty_input() {
        let codec = Lz77Codec::default();
        let tokens: Vec<Token<u8>> = codec.compress(b"").unwrap();
        assert!(tokens.is_empty());
        assert!(codec.decompress(&tokens).unwrap().is_empty());
    }

    #[test]
    fn test_no_repetition() {
        // When there is no repetition, every token should be a literal.
        let input = b"abcdefg";
        let codec = Lz77Codec::new(16, 8).unwrap();
        let tokens = codec.compress(input).unwrap();
        for token in &tokens {
            assert!(token.is_literal());
            assert!(token.next.is_some());
        }
        assert_eq!(codec.decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_abababab() {
        let codec = Lz77Codec::new(100, 100).unwrap();
        let input = chars("abababab");
        let tokens = codec.compress(&input).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::literal('a'),
                Token::literal('b'),
                Token { offset: 2, length: 2, next: Some('a') },
                Token { offset: 4, length: 3, next: None },
            ]
        );
        assert_eq!(codec.decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_tie_goes_to_earliest_candidate() {
        // "ab" occurs at offsets 4 and 2; the scan meets the farther one first.
        let (offset, length) = find_longest_match(&chars("ababab"), 4, 100, 100);
        assert_eq!((offset, length), (4, 2));
    }

    #[test]
    fn test_window_limits_search() {
        let input = chars("abcxyzabc");
        assert_eq!(find_longest_match(&input, 6, 100, 100), (6, 3));
        assert_eq!(find_longest_match(&input, 6, 3, 100), (0, 0));
        assert_eq!(find_longest_match(&input, 6, 100, 2), (6, 2));
    }

    #[test]
    fn test_single_character_repetition() {
        let codec = Lz77Codec::new(16, 8).unwrap();
        let input = b"aaaaaaa";
        let tokens = codec.compress(input).unwrap();
        assert_eq!(codec.decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_compress_decompress() {
        let input = b"abracadabra abracadabra";
        // Use a moderate window and lookahead sizes.
        let codec = Lz77Codec::new(16, 8).unwrap();
        let tokens = codec.compress(input).unwrap();
        assert_eq!(codec.decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_longer_input() {
        let input = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. \
                      Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua.";
        let codec = Lz77Codec::new(32, 16).unwrap();
        let tokens = codec.compress(input).unwrap();
        assert_eq!(codec.decompress(&tokens).unwrap(), input);
    }

    #[test]
    fn test_overlapping_copy() {
        let codec = Lz77Codec::default();
        let tokens = vec![Token::literal('a'), Token { offset: 1, length: 5, next: Some('b') }];
        assert_eq!(codec.decompress(&tokens).unwrap(), chars("aaaaaab"));
    }

    #[test]
    fn test_reference_before_start_is_shape_mismatch() {
        let codec = Lz77Codec::default();
        let tokens = vec![Token::literal('a'), Token { offset: 2, length: 1, next: None }];
        assert!(matches!(
            codec.decompress(&tokens),
            Err(Error::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(matches!(
            Lz77Codec::new(0, 8),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Lz77Codec::new(8, 0),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_encoded_size() {
        let codec = Lz77Codec::new(100, 100).unwrap();
        let tokens = codec.compress(&chars("abababab")).unwrap();
        // Offsets up to 4 take 3 bits, lengths up to 3 take 2 bits.
        assert_eq!(codec.encoded_size(&tokens), 4 * (3 + 2 + 8));
    }
}
