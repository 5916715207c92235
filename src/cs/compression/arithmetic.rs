//! Arithmetic coding over a static, sorted cumulative probability table.
//!
//! The whole message becomes one [`Decimal`] in `[0, 1)`. All arithmetic is
//! rounded to the codec precision (significant decimal digits), so the
//! precision bounds how much information a code can carry: a message whose
//! information content approaches the precision decodes incorrectly. The
//! default precision is fixed; [`ArithmeticCodec::sized_for`] picks one large
//! enough for a given input.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{Codec, Symbol};
use crate::cs::compression::decimal::{Decimal, DecimalContext};
use crate::error::{Error, Result};

pub(crate) const NAME: &str = "Arithmetic Coding";

/// Default number of significant decimal digits.
pub const DEFAULT_PRECISION: usize = 50;

/// Extra digits on top of the estimated information content.
const GUARD_DIGITS: usize = 10;

/// Bits charged per probability-table entry on top of the symbol itself.
const TABLE_ENTRY_BITS: usize = 32;

/// Bits charged for the message length.
const LENGTH_BITS: usize = 32;

/// Half-open interval `[low, high)` assigned to one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub low: Decimal,
    pub high: Decimal,
}

impl Interval {
    pub fn contains(&self, value: &Decimal) -> bool {
        self.low <= *value && *value < self.high
    }
}

/// Contiguous partition of `[0, 1)` in ascending symbol order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeTable<S> {
    intervals: BTreeMap<S, Interval>,
}

impl<S: Symbol> CumulativeTable<S> {
    /// Accumulates probabilities in ascending symbol order.
    pub fn new(probabilities: &BTreeMap<S, Decimal>, ctx: &DecimalContext) -> Self {
        let mut cumulative = Decimal::zero();
        let mut intervals = BTreeMap::new();
        for (&symbol, probability) in probabilities {
            let high = ctx.add(&cumulative, probability);
            intervals.insert(
                symbol,
                Interval {
                    low: cumulative,
                    high: high.clone(),
                },
            );
            cumulative = high;
        }
        CumulativeTable { intervals }
    }

    pub fn interval(&self, symbol: &S) -> Option<&Interval> {
        self.intervals.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&S, &Interval)> {
        self.intervals.iter()
    }

    /// The interval containing `code`, scanning in ascending order. When
    /// rounding leaves `code` outside every interval the last one is used and
    /// the third element is `true`.
    pub fn locate(&self, code: &Decimal) -> Option<(S, &Interval, bool)> {
        if let Some((symbol, interval)) = self.intervals.iter().find(|(_, i)| i.contains(code)) {
            return Some((*symbol, interval, false));
        }
        self.intervals
            .iter()
            .next_back()
            .map(|(symbol, interval)| (*symbol, interval, true))
    }
}

/// Symbol probabilities `count / total`, rounded to the context precision.
pub fn calculate_probabilities<S: Symbol>(
    input: &[S],
    ctx: &DecimalContext,
) -> Result<BTreeMap<S, Decimal>> {
    let mut counts: BTreeMap<S, usize> = BTreeMap::new();
    for &symbol in input {
        *counts.entry(symbol).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(symbol, count)| {
            ctx.ratio(count, input.len())
                .map(|p| (symbol, p))
                .ok_or_else(|| Error::invalid_configuration("probabilities of an empty input"))
        })
        .collect()
}

/// Digits needed to code `input` without interval collapse: the information
/// content in decimal digits, the rounding error accumulated over the message,
/// and a guard margin. Never less than [`DEFAULT_PRECISION`].
pub fn required_precision<S: Symbol>(input: &[S]) -> usize {
    if input.is_empty() {
        return DEFAULT_PRECISION;
    }
    let mut counts: BTreeMap<S, usize> = BTreeMap::new();
    for &symbol in input {
        *counts.entry(symbol).or_insert(0) += 1;
    }
    let total = input.len() as f64;
    let information: f64 = counts
        .values()
        .map(|&count| count as f64 * (total / count as f64).log10())
        .sum();
    let digits = (information + total.log10()).ceil() as usize + GUARD_DIGITS;
    digits.max(DEFAULT_PRECISION)
}

/// Output of [`ArithmeticCodec::compress`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = ""))]
pub struct ArithmeticEncoded<S: Symbol> {
    /// Midpoint of the final interval; `None` for an empty message.
    pub code: Option<Decimal>,
    pub probabilities: BTreeMap<S, Decimal>,
    pub length: usize,
}

impl<S: Symbol> ArithmeticEncoded<S> {
    /// Code digits at log2(10) bits each, plus the probability table and length.
    pub fn size_in_bits(&self) -> usize {
        let Some(code) = &self.code else {
            return 0;
        };
        let digits = code.significant_digits() as f64;
        let code_bits = (digits * std::f64::consts::LOG2_10).ceil() as usize;
        let table_bits: usize = self
            .probabilities
            .keys()
            .map(|symbol| symbol.bit_width() + TABLE_ENTRY_BITS)
            .sum();
        code_bits + table_bits + LENGTH_BITS
    }
}

/// Decoded symbols plus interval-fallback diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport<S> {
    pub symbols: Vec<S>,
    /// Steps where the code fell outside every interval.
    pub fallbacks: usize,
}

impl<S> DecodeReport<S> {
    /// True when rounding forced at least one fallback; the output is then
    /// suspect.
    pub fn precision_exhausted(&self) -> bool {
        self.fallbacks > 0
    }
}

/// Interval coder over arbitrary-precision decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticCodec {
    precision: usize,
}

impl Default for ArithmeticCodec {
    fn default() -> Self {
        ArithmeticCodec {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ArithmeticCodec {
    /// Codec rounding to `precision` significant digits.
    pub fn new(precision: usize) -> Result<Self> {
        if precision == 0 {
            return Err(Error::invalid_configuration(
                "arithmetic precision must be at least one digit",
            ));
        }
        Ok(ArithmeticCodec { precision })
    }

    /// Codec with a precision large enough for `input`.
    pub fn sized_for<S: Symbol>(input: &[S]) -> Self {
        ArithmeticCodec {
            precision: required_precision(input),
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    fn context(&self) -> DecimalContext {
        DecimalContext::new(self.precision)
    }

    /// Decodes and reports how often rounding forced the last-interval fallback.
    pub fn decompress_with_report<S: Symbol>(
        &self,
        encoded: &ArithmeticEncoded<S>,
    ) -> Result<DecodeReport<S>> {
        if encoded.length == 0 {
            return Ok(DecodeReport {
                symbols: Vec::new(),
                fallbacks: 0,
            });
        }
        let mut code = encoded
            .code
            .clone()
            .ok_or_else(|| Error::shape_mismatch("missing code for a non-empty message"))?;
        let ctx = self.context();
        let table = CumulativeTable::new(&encoded.probabilities, &ctx);

        let mut symbols = Vec::with_capacity(encoded.length);
        let mut fallbacks = 0;
        for position in 0..encoded.length {
            let (symbol, interval, fell_back) = table.locate(&code).ok_or_else(|| {
                Error::invalid_configuration("empty probability table for a non-empty message")
            })?;
            if fell_back {
                fallbacks += 1;
            }
            symbols.push(symbol);

            let width = ctx.sub(&interval.high, &interval.low);
            code = ctx
                .div(&ctx.sub(&code, &interval.low), &width)
                .ok_or(Error::PrecisionOverflow {
                    digits: self.precision,
                    position,
                })?;
        }

        if fallbacks > 0 {
            warn!(
                "arithmetic: {} of {} symbols decoded by fallback, precision {} is exhausted",
                fallbacks, encoded.length, self.precision
            );
        }
        Ok(DecodeReport { symbols, fallbacks })
    }
}

impl<S: Symbol> Codec<S> for ArithmeticCodec {
    type Encoded = ArithmeticEncoded<S>;

    fn name(&self) -> &'static str {
        NAME
    }

    fn compress(&self, input: &[S]) -> Result<ArithmeticEncoded<S>> {
        if input.is_empty() {
            return Ok(ArithmeticEncoded {
                code: None,
                probabilities: BTreeMap::new(),
                length: 0,
            });
        }

        let ctx = self.context();
        let probabilities = calculate_probabilities(input, &ctx)?;
        let table = CumulativeTable::new(&probabilities, &ctx);

        let mut low = Decimal::zero();
        let mut high = Decimal::one();
        for symbol in input {
            let interval = table.interval(symbol).ok_or_else(|| {
                Error::shape_mismatch(format!("symbol {:?} missing from the model", symbol))
            })?;
            let range = ctx.sub(&high, &low);
            high = ctx.add(&low, &ctx.mul(&range, &interval.high));
            low = ctx.add(&low, &ctx.mul(&range, &interval.low));
        }

        let code = ctx
            .div(&ctx.add(&low, &high), &Decimal::from(2u64))
            .ok_or_else(|| Error::shape_mismatch("midpoint of the final interval"))?;
        debug!(
            "arithmetic: {} symbols, {} distinct, final width {}, code has {} digits",
            input.len(),
            table.len(),
            ctx.sub(&high, &low),
            code.significant_digits()
        );

        Ok(ArithmeticEncoded {
            code: Some(code),
            probabilities,
            length: input.len(),
        })
    }

    fn decompress(&self, encoded: &ArithmeticEncoded<S>) -> Result<Vec<S>> {
        self.decompress_with_report(encoded).map(|report| report.symbols)
    }

    fn encoded_size(&self, encoded: &ArithmeticEncoded<S>) -> usize {
        encoded.size_in_bits()
    }
}
