//! Arbitrary-precision decimal arithmetic with a fixed number of significant digits.
//!
//! A [`Decimal`] is `coefficient * 10^exponent`. Values are exact; rounding
//! happens only in [`DecimalContext`] operations, which compute the exact
//! result and round it to the context precision with round-half-even.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

const LOG10_2: f64 = std::f64::consts::LOG10_2;

/// Largest exponent magnitude accepted when parsing.
const MAX_EXPONENT: u64 = 1_000_000;

fn pow10(exp: usize) -> BigUint {
    num_traits::pow(BigUint::from(10u32), exp)
}

/// Number of decimal digits in `value` (1 for zero).
fn digit_count(value: &BigUint) -> usize {
    if value.is_zero() {
        return 1;
    }
    // Estimate from the bit length, corrected by at most one either way.
    let estimate = ((value.bits() - 1) as f64 * LOG10_2) as usize + 1;
    if *value >= pow10(estimate) {
        estimate + 1
    } else if estimate > 1 && *value < pow10(estimate - 1) {
        estimate - 1
    } else {
        estimate
    }
}

/// An exact decimal number.
#[derive(Debug, Clone)]
pub struct Decimal {
    coefficient: BigInt,
    exponent: i64,
}

impl Decimal {
    pub fn new(coefficient: BigInt, exponent: i64) -> Self {
        Decimal {
            coefficient,
            exponent,
        }
    }

    pub fn zero() -> Self {
        Decimal::new(BigInt::zero(), 0)
    }

    pub fn one() -> Self {
        Decimal::new(BigInt::one(), 0)
    }

    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    /// Digits of the coefficient once trailing zeros are removed.
    pub fn significant_digits(&self) -> usize {
        self.normalized().map_or(1, |(digits, _)| digits.len())
    }

    /// Coefficient digits without trailing zeros and the matching exponent,
    /// or `None` for zero.
    fn normalized(&self) -> Option<(String, i64)> {
        if self.is_zero() {
            return None;
        }
        let digits = self.coefficient.magnitude().to_string();
        let trimmed = digits.trim_end_matches('0');
        let exponent = self.exponent + (digits.len() - trimmed.len()) as i64;
        Some((trimmed.to_string(), exponent))
    }

    fn neg(&self) -> Decimal {
        Decimal::new(-self.coefficient.clone(), self.exponent)
    }

    /// Both coefficients scaled to the smaller exponent.
    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, i64) {
        let exponent = self.exponent.min(other.exponent);
        let scale = |d: &Decimal| {
            let shift = (d.exponent - exponent) as usize;
            if shift == 0 {
                d.coefficient.clone()
            } else {
                &d.coefficient * BigInt::from(pow10(shift))
            }
        };
        (scale(self), scale(other), exponent)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<usize> for Decimal {
    fn from(value: usize) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.exponent == other.exponent {
            return self.coefficient.cmp(&other.coefficient);
        }
        let (a, b, _) = self.aligned(other);
        a.cmp(&b)
    }
}

/// Plain positional notation with trailing fractional zeros removed.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((digits, exponent)) = self.normalized() else {
            return f.write_str("0");
        };
        if self.is_negative() {
            f.write_str("-")?;
        }
        if exponent >= 0 {
            return write!(f, "{}{}", digits, "0".repeat(exponent as usize));
        }
        let point = digits.len() as i64 + exponent;
        if point <= 0 {
            write!(f, "0.{}{}", "0".repeat((-point) as usize), digits)
        } else {
            let (whole, fraction) = digits.split_at(point as usize);
            write!(f, "{}.{}", whole, fraction)
        }
    }
}

impl FromStr for Decimal {
    type Err = Error;

    /// Accepts `[-+]digits[.digits][e[-+]digits]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::shape_mismatch(format!("malformed decimal {:?}", s));
        let trimmed = s.trim();
        let (mantissa, exp_part) = match trimmed.find(['e', 'E']) {
            Some(pos) => (&trimmed[..pos], Some(&trimmed[pos + 1..])),
            None => (trimmed, None),
        };
        let (negative, unsigned) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let digits = format!("{}{}", whole, fraction);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(malformed)?;
        let mut exponent = -i64::try_from(fraction.len()).map_err(|_| malformed())?;
        if let Some(exp) = exp_part {
            let exp: i64 = exp.parse().map_err(|_| malformed())?;
            exponent = exponent.checked_add(exp).ok_or_else(malformed)?;
        }
        if exponent.unsigned_abs() > MAX_EXPONENT {
            return Err(malformed());
        }
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(Decimal::new(BigInt::from_biguint(sign, magnitude), exponent))
    }
}

/// Serialized as its plain decimal string, so no digits are lost.
impl Serialize for Decimal {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

/// Rounding context: every result is rounded to `precision` significant digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: usize,
}

impl DecimalContext {
    pub fn new(precision: usize) -> Self {
        DecimalContext {
            precision: precision.max(1),
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Rounds half-even to the context precision.
    pub fn round(&self, value: Decimal) -> Decimal {
        let magnitude = value.coefficient.magnitude();
        let digits = digit_count(magnitude);
        if digits <= self.precision {
            return value;
        }
        let shift = digits - self.precision;
        let divisor = pow10(shift);
        let (quotient, remainder) = magnitude.div_rem(&divisor);
        let round_up = match (remainder * 2u32).cmp(&divisor) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => quotient.is_odd(),
        };
        let mut quotient = if round_up { quotient + 1u32 } else { quotient };
        let mut exponent = value.exponent + shift as i64;
        // 99..9 rounded up to 10^precision
        if digit_count(&quotient) > self.precision {
            quotient /= 10u32;
            exponent += 1;
        }
        Decimal::new(BigInt::from_biguint(value.coefficient.sign(), quotient), exponent)
    }

    pub fn add(&self, a: &Decimal, b: &Decimal) -> Decimal {
        let (x, y, exponent) = a.aligned(b);
        self.round(Decimal::new(x + y, exponent))
    }

    pub fn sub(&self, a: &Decimal, b: &Decimal) -> Decimal {
        self.add(a, &b.neg())
    }

    pub fn mul(&self, a: &Decimal, b: &Decimal) -> Decimal {
        self.round(Decimal::new(
            &a.coefficient * &b.coefficient,
            a.exponent + b.exponent,
        ))
    }

    /// Correctly rounded quotient, or `None` when dividing by zero.
    pub fn div(&self, a: &Decimal, b: &Decimal) -> Option<Decimal> {
        if b.is_zero() {
            return None;
        }
        if a.is_zero() {
            return Some(Decimal::new(BigInt::zero(), a.exponent - b.exponent));
        }
        let numerator = a.coefficient.magnitude();
        let denominator = b.coefficient.magnitude();
        // Scale so the integer quotient carries at least two guard digits.
        let scale = (self.precision + 2 + digit_count(denominator))
            .saturating_sub(digit_count(numerator));
        let (quotient, remainder) = (numerator * pow10(scale)).div_rem(denominator);
        // Sticky digit: a non-zero remainder must never round as an exact half.
        let mut quotient = quotient * 10u32;
        if !remainder.is_zero() {
            quotient += 1u32;
        }
        let sign = if a.coefficient.sign() == b.coefficient.sign() {
            Sign::Plus
        } else {
            Sign::Minus
        };
        Some(self.round(Decimal::new(
            BigInt::from_biguint(sign, quotient),
            a.exponent - b.exponent - scale as i64 - 1,
        )))
    }

    /// `numerator / denominator` for counts.
    pub fn ratio(&self, numerator: usize, denominator: usize) -> Option<Decimal> {
        self.div(&Decimal::from(numerator), &Decimal::from(denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(d("0.5").to_string(), "0.5");
        assert_eq!(d("0.500").to_string(), "0.5");
        assert_eq!(d("-12.0340").to_string(), "-12.034");
        assert_eq!(d("1e3").to_string(), "1000");
        assert_eq!(d("25e-4").to_string(), "0.0025");
        assert_eq!(d("0").to_string(), "0");
        assert!("abc".parse::<Decimal>().is_err());
        assert!("1.2.3".parse::<Decimal>().is_err());
        assert!("".parse::<Decimal>().is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range_exponents() {
        for input in [
            "0.5e-9223372036854775808",
            "1e9223372036854775807",
            "1e-1000001",
            "1e99999999999999999999",
        ] {
            assert!(
                matches!(input.parse::<Decimal>(), Err(Error::ShapeMismatch(_))),
                "{} should be rejected",
                input
            );
        }
        assert_eq!(d("1e1000000").significant_digits(), 1);
    }

    #[test]
    fn test_serde_as_string() {
        let value = d("0.000125");
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"0.000125\"");
        assert_eq!(serde_json::from_str::<Decimal>(&json).unwrap(), value);
        assert!(serde_json::from_str::<Decimal>("\"1e9223372036854775807\"").is_err());
        assert!(serde_json::from_str::<Decimal>("0.5").is_err());
    }

    #[test]
    fn test_compare_by_value() {
        assert_eq!(d("0.5"), d("0.50000"));
        assert!(d("0.25") < d("0.3"));
        assert!(d("-1") < d("0.001"));
        assert_eq!(d("100").cmp(&d("1e2")), Ordering::Equal);
    }

    #[test]
    fn test_round_half_even() {
        let ctx = DecimalContext::new(3);
        assert_eq!(ctx.round(d("1.2345")), d("1.23"));
        assert_eq!(ctx.round(d("1.235")), d("1.24"));
        assert_eq!(ctx.round(d("1.245")), d("1.24"));
        assert_eq!(ctx.round(d("1.2451")), d("1.25"));
        assert_eq!(ctx.round(d("9.996")), d("10.0"));
        assert_eq!(ctx.round(d("-1.235")), d("-1.24"));
    }

    #[test]
    fn test_division() {
        let ctx = DecimalContext::new(5);
        assert_eq!(ctx.div(&d("1"), &d("3")).unwrap(), d("0.33333"));
        assert_eq!(ctx.div(&d("2"), &d("3")).unwrap(), d("0.66667"));
        assert_eq!(ctx.div(&d("1"), &d("2")).unwrap(), d("0.5"));
        assert_eq!(ctx.div(&d("-1"), &d("8")).unwrap(), d("-0.125"));
        assert_eq!(ctx.div(&d("0"), &d("7")).unwrap(), d("0"));
        assert!(ctx.div(&d("1"), &d("0")).is_none());
    }

    #[test]
    fn test_division_sticky_digit() {
        // 1.00005000001 is just above the halfway point between 1.0000 and 1.0001.
        let ctx = DecimalContext::new(5);
        let q = ctx.div(&d("100005000001"), &d("100000000000")).unwrap();
        assert_eq!(q, d("1.0001"));
    }

    #[test]
    fn test_add_sub_mul() {
        let ctx = DecimalContext::new(50);
        let third = ctx.ratio(1, 3).unwrap();
        let sum = ctx.add(&ctx.add(&third, &third), &third);
        assert_eq!(sum, d(&format!("0.{}", "9".repeat(50))));
        assert_eq!(ctx.sub(&d("1"), &d("0.25")), d("0.75"));
        assert_eq!(ctx.mul(&d("0.5"), &d("0.5")), d("0.25"));

        let short = DecimalContext::new(2);
        assert_eq!(short.add(&d("1"), &d("0.001")), d("1"));
        assert_eq!(short.mul(&d("0.33"), &d("0.33")), d("0.11"));
    }

    #[test]
    fn test_significant_digits() {
        assert_eq!(d("0.1250").significant_digits(), 3);
        assert_eq!(d("1000").significant_digits(), 1);
        assert_eq!(Decimal::zero().significant_digits(), 1);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(&BigUint::from(0u32)), 1);
        assert_eq!(digit_count(&BigUint::from(9u32)), 1);
        assert_eq!(digit_count(&BigUint::from(10u32)), 2);
        assert_eq!(digit_count(&pow10(40)), 41);
        assert_eq!(digit_count(&(pow10(40) - 1u32)), 40);
    }
}
