//! # Fixed-Point Prices
//!
//! **NO FLOATING POINT IN MONEY CALCULATIONS**
//!
//! Every currency amount the optimizer touches is a [`Price`]: a `u64` holding
//! the amount in millionths of a currency unit. Floats appear only at the
//! market-data boundary, where [`Price::from_f64_rounded`] converts them once.
//!
//! Cost-per-fragment ratios are never computed as a quotient. Two ratios are
//! compared by cross-multiplying in `u128` (see [`cmp_per_fragment`]), which is
//! exact and identical on every platform.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{OptimizerError, OptimizerResult};

/// Number of decimal places.
const DECIMAL_PLACES: u32 = 6;

/// The multiplier for 6 decimal places.
const MULTIPLIER: u64 = 10u64.pow(DECIMAL_PLACES);

/// Fixed-point currency amount with 6 decimal places.
///
/// Internally stores value * 1,000,000 as a u64.
///
/// # Range
///
/// - Minimum: 0.000000
/// - Maximum: 18,446,744,073,709.551615
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Price(u64);

impl Price {
    /// Zero value.
    pub const ZERO: Self = Self(0);

    /// One unit (1.000000).
    pub const ONE: Self = Self(MULTIPLIER);

    /// Maximum representable value.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a price from a whole number of currency units.
    ///
    /// ```rust,ignore
    /// let ten = Price::from_whole(10); // 10.000000
    /// ```
    #[inline]
    #[must_use]
    pub const fn from_whole(whole: u64) -> Self {
        Self(whole * MULTIPLIER)
    }

    /// Creates a price from a whole part and millionths (0-999999).
    ///
    /// Out-of-range `micros` panic in debug builds and wrap modulo one unit
    /// in release builds.
    #[inline]
    #[must_use]
    pub const fn from_parts(whole: u64, micros: u32) -> Self {
        debug_assert!((micros as u64) < MULTIPLIER);
        Self(whole * MULTIPLIER + (micros as u64 % MULTIPLIER))
    }

    /// Creates a price from its raw value in millionths.
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Returns the raw value in millionths.
    #[inline]
    #[must_use]
    pub const fn micros(self) -> u64 {
        self.0
    }

    /// Returns the whole number part.
    #[inline]
    #[must_use]
    pub const fn whole(self) -> u64 {
        self.0 / MULTIPLIER
    }

    /// Returns the fractional part in millionths (0-999999).
    #[inline]
    #[must_use]
    pub const fn fraction(self) -> u32 {
        (self.0 % MULTIPLIER) as u32
    }

    /// Returns true if this value is zero.
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by a unit count. Returns `None` on overflow.
    #[inline]
    #[must_use]
    pub const fn checked_mul_int(self, rhs: u64) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Safe addition with error on overflow.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::ArithmeticOverflow` if the sum does not fit.
    #[inline]
    pub fn safe_add(self, rhs: Self) -> OptimizerResult<Self> {
        self.checked_add(rhs).ok_or(OptimizerError::ArithmeticOverflow)
    }

    /// Safe multiplication by a unit count.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::ArithmeticOverflow` if the product does not fit.
    #[inline]
    pub fn safe_mul_int(self, rhs: u64) -> OptimizerResult<Self> {
        self.checked_mul_int(rhs)
            .ok_or(OptimizerError::ArithmeticOverflow)
    }

    /// Converts a floating-point amount from market data, rounding to the
    /// nearest millionth.
    ///
    /// # Errors
    ///
    /// Returns `OptimizerError::InvalidPrice` for NaN, infinities, negative
    /// amounts and amounts beyond [`Price::MAX`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_f64_rounded(value: f64) -> OptimizerResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(OptimizerError::InvalidPrice(format!("{value}")));
        }
        let scaled = (value * MULTIPLIER as f64).round();
        if scaled >= u64::MAX as f64 {
            return Err(OptimizerError::InvalidPrice(format!("{value}")));
        }
        Ok(Self(scaled as u64))
    }
}

/// Compares `a_price / a_yield` against `b_price / b_yield` without division.
///
/// Yields must be positive; the pool builder guarantees this.
#[inline]
#[must_use]
pub fn cmp_per_fragment(a_price: Price, a_yield: u32, b_price: Price, b_yield: u32) -> Ordering {
    let lhs = u128::from(a_price.0) * u128::from(b_yield);
    let rhs = u128::from(b_price.0) * u128::from(a_yield);
    lhs.cmp(&rhs)
}

impl Add for Price {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Price {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Mul<u64> for Price {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_mul(rhs))
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price({}.{:06})", self.whole(), self.fraction())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.whole(), self.fraction())
    }
}

impl FromStr for Price {
    type Err = OptimizerError;

    /// Parses plain decimal text: `"10"`, `"0.5"`, `"1.234567"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || OptimizerError::InvalidPrice(s.to_string());
        let text = s.trim();
        let (whole_text, frac_text) = match text.split_once('.') {
            Some((w, f)) => (w, f),
            None => (text, ""),
        };
        if whole_text.is_empty() && frac_text.is_empty() {
            return Err(invalid());
        }
        if frac_text.len() > DECIMAL_PLACES as usize {
            return Err(invalid());
        }
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(whole_text) || !all_digits(frac_text) {
            return Err(invalid());
        }

        let whole: u64 = if whole_text.is_empty() {
            0
        } else {
            whole_text.parse().map_err(|_| invalid())?
        };
        let mut micros: u64 = if frac_text.is_empty() {
            0
        } else {
            frac_text.parse().map_err(|_| invalid())?
        };
        for _ in frac_text.len()..DECIMAL_PLACES as usize {
            micros *= 10;
        }

        whole
            .checked_mul(MULTIPLIER)
            .and_then(|w| w.checked_add(micros))
            .map(Self)
            .ok_or_else(invalid)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // One correctly rounded division, exact inputs up to 2^53 micros.
        #[allow(clippy::cast_precision_loss)]
        let value = self.0 as f64 / MULTIPLIER as f64;
        serializer.serialize_f64(value)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal number or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        v.checked_mul(MULTIPLIER)
            .map(Price)
            .ok_or_else(|| E::custom(format!("price {v} out of range")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        let v = u64::try_from(v).map_err(|_| E::custom(format!("negative price {v}")))?;
        self.visit_u64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Price::from_f64_rounded(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_whole() {
        let value = Price::from_whole(100);
        assert_eq!(value.whole(), 100);
        assert_eq!(value.fraction(), 0);
    }

    #[test]
    fn test_from_parts() {
        let value = Price::from_parts(3, 141_592);
        assert_eq!(value.whole(), 3);
        assert_eq!(value.fraction(), 141_592);
    }

    #[test]
    fn test_addition() {
        let a = Price::from_parts(1, 500_000);
        let b = Price::from_parts(2, 300_000);
        let result = a + b;
        assert_eq!(result, Price::from_parts(3, 800_000));
    }

    #[test]
    fn test_checked_overflow() {
        assert!(Price::MAX.checked_add(Price::ONE).is_none());
        assert!(Price::MAX.checked_mul_int(2).is_none());
        assert_eq!(
            Price::MAX.safe_mul_int(2),
            Err(OptimizerError::ArithmeticOverflow)
        );
    }

    #[test]
    fn test_display() {
        let value = Price::from_parts(42, 123_456);
        assert_eq!(format!("{value}"), "42.123456");
    }

    #[test]
    fn test_parse_decimal_text() {
        assert_eq!("10".parse::<Price>().unwrap(), Price::from_whole(10));
        assert_eq!("0.5".parse::<Price>().unwrap(), Price::from_parts(0, 500_000));
        assert_eq!(".25".parse::<Price>().unwrap(), Price::from_parts(0, 250_000));
        assert_eq!(
            "1.234567".parse::<Price>().unwrap(),
            Price::from_parts(1, 234_567)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", ".", "-1", "1.2345678", "1e3", "abc", "1.2.3"] {
            assert!(text.parse::<Price>().is_err(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn test_from_f64_rounds_to_micros() {
        assert_eq!(
            Price::from_f64_rounded(0.1 + 0.2).unwrap(),
            Price::from_parts(0, 300_000)
        );
        assert_eq!(Price::from_f64_rounded(1.34).unwrap(), Price::from_parts(1, 340_000));
        assert!(Price::from_f64_rounded(-0.01).is_err());
        assert!(Price::from_f64_rounded(f64::NAN).is_err());
        assert!(Price::from_f64_rounded(f64::INFINITY).is_err());
    }

    #[test]
    fn test_per_fragment_comparison_is_exact() {
        // 3 / 9 == 1 / 3
        assert_eq!(
            cmp_per_fragment(Price::from_whole(3), 9, Price::from_whole(1), 3),
            Ordering::Equal
        );
        // 1 / 4 < 1 / 2
        assert_eq!(
            cmp_per_fragment(Price::ONE, 4, Price::ONE, 2),
            Ordering::Less
        );
        // 11 / 200 > 0.05 / 1
        assert_eq!(
            cmp_per_fragment(Price::from_whole(11), 200, Price::from_parts(0, 50_000), 1),
            Ordering::Greater
        );
    }

    #[test]
    fn test_serde_json() {
        let price: Price = serde_json::from_str("1.5").unwrap();
        assert_eq!(price, Price::from_parts(1, 500_000));
        let price: Price = serde_json::from_str("\"2.25\"").unwrap();
        assert_eq!(price, Price::from_parts(2, 250_000));
        let price: Price = serde_json::from_str("7").unwrap();
        assert_eq!(price, Price::from_whole(7));
        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert_eq!(serde_json::to_string(&Price::from_parts(3, 0)).unwrap(), "3.0");
    }

    #[test]
    fn test_serde_json_fractions_are_exact() {
        for (price, expected) in [
            (Price::from_parts(1, 140_000), "1.14"),
            (Price::from_parts(1, 360_000), "1.36"),
            (Price::from_parts(1, 570_000), "1.57"),
            (Price::from_parts(42, 123_456), "42.123456"),
        ] {
            assert_eq!(serde_json::to_string(&price).unwrap(), expected);
        }

        for micros in (0..50_000_000u64).step_by(10_000) {
            let json = serde_json::to_string(&Price::from_micros(micros)).unwrap();
            let back: Price = serde_json::from_str(&json).unwrap();
            assert_eq!(back.micros(), micros, "{json}");
            assert_eq!(json.parse::<f64>().unwrap(), micros as f64 / 1e6);
        }
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_from_parts_rejects_overflowing_micros() {
        let _ = Price::from_parts(1, 1_000_000);
    }
}
