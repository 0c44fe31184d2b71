use std::{
    fmt,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::EngineError;

/// Signed money amount represented as an integer count of **minor units** at
/// fixed scale 4 (one unit = `0.0001`).
///
/// Use this type for **all** monetary values in the engine (balances, transfer
/// amounts, deltas) to avoid floating-point drift.
///
/// The value is signed:
/// - positive = credit / increase
/// - negative = debit / decrease
///
/// # Examples
///
/// ```rust
/// use engine::Amount;
///
/// let amount = Amount::new(125_000);
/// assert_eq!(amount.units(), 125_000);
/// assert_eq!(amount.to_string(), "12.5000");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more than 4 decimals):
///
/// ```rust
/// use engine::Amount;
///
/// assert_eq!("10".parse::<Amount>().unwrap().units(), 100_000);
/// assert_eq!("10,5".parse::<Amount>().unwrap().units(), 105_000);
/// assert!("12.50001".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Minor units per whole unit (scale 4).
    pub const UNITS_PER_WHOLE: i64 = 10_000;

    /// Largest magnitude accepted from the wire: one billion whole units.
    ///
    /// Balances can exceed this internally; the bound only rejects absurd
    /// request payloads before they reach checked arithmetic.
    pub const MAX_UNITS: i64 = 1_000_000_000 * Amount::UNITS_PER_WHOLE;

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn new(units: i64) -> Self {
        Self(units)
    }

    /// Creates an amount from whole units (`from_whole(3)` is `3.0000`).
    #[must_use]
    pub const fn from_whole(whole: i64) -> Self {
        Self(whole * Amount::UNITS_PER_WHOLE)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn units(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    /// Fixed-point rendering with exactly 4 fraction digits (`"12.5000"`).
    ///
    /// This is the canonical wire and persistence format; parsing the output
    /// always round-trips to the same value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Amount::UNITS_PER_WHOLE as u64;
        let frac = abs % Amount::UNITS_PER_WHOLE as u64;
        write!(f, "{sign}{whole}.{frac:04}")
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Self::Output {
        Amount(self.0 - rhs.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount(-self.0)
    }
}

impl FromStr for Amount {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 4 fractional digits (rejects `12.50001`)
    /// - rejects empty/invalid strings
    /// - rejects magnitudes above [`Amount::MAX_UNITS`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (sign, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (-1i64, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (1i64, stripped)
        } else {
            (1i64, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let whole_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let whole: i64 = whole_str.parse().map_err(|_| invalid())?;

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > 4 {
                    return Err(EngineError::InvalidAmount(
                        "too many decimals".to_string(),
                    ));
                }
                let parsed: i64 = frac.parse().map_err(|_| invalid())?;
                parsed * 10i64.pow(4 - frac.len() as u32)
            }
        };

        let total = whole
            .checked_mul(Amount::UNITS_PER_WHOLE)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(overflow)?;

        if total > Amount::MAX_UNITS {
            return Err(overflow());
        }

        let signed = if sign < 0 { -total } else { total };

        Ok(Amount(signed))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Rational tax rate expressed in basis points (1 bps = 0.01%).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaxRate {
    bps: u32,
}

impl TaxRate {
    pub const ZERO: TaxRate = TaxRate { bps: 0 };

    /// Builds a rate from basis points; rates above 100% are rejected.
    pub fn from_bps(bps: u32) -> Result<Self, EngineError> {
        if bps > 10_000 {
            return Err(EngineError::InvalidAmount(format!(
                "tax rate above 100%: {bps} bps"
            )));
        }
        Ok(Self { bps })
    }

    /// Returns the rate in basis points.
    #[must_use]
    pub const fn bps(self) -> u32 {
        self.bps
    }

    /// Applies the rate to an amount, truncating toward zero at scale 4.
    #[must_use]
    pub fn apply(self, amount: Amount) -> Amount {
        let scaled = i128::from(amount.units()) * i128::from(self.bps) / 10_000;
        Amount::new(scaled as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_fixed_point_scale_4() {
        assert_eq!(Amount::new(0).to_string(), "0.0000");
        assert_eq!(Amount::new(1).to_string(), "0.0001");
        assert_eq!(Amount::new(5_000).to_string(), "0.5000");
        assert_eq!(Amount::new(125_000).to_string(), "12.5000");
        assert_eq!(Amount::new(-125_000).to_string(), "-12.5000");
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        assert_eq!("10".parse::<Amount>().unwrap().units(), 100_000);
        assert_eq!("10.5".parse::<Amount>().unwrap().units(), 105_000);
        assert_eq!("10,5000".parse::<Amount>().unwrap().units(), 105_000);
        assert_eq!("-0.0001".parse::<Amount>().unwrap().units(), -1);
        assert_eq!("+1.00".parse::<Amount>().unwrap().units(), 10_000);
        assert_eq!("  2.30 ".parse::<Amount>().unwrap().units(), 23_000);
    }

    #[test]
    fn parse_rejects_more_than_four_decimals() {
        assert!("12.50001".parse::<Amount>().is_err());
        assert!("0.00001".parse::<Amount>().is_err());
    }

    #[test]
    fn parse_rejects_garbage_and_overflow() {
        assert!("".parse::<Amount>().is_err());
        assert!("ten".parse::<Amount>().is_err());
        assert!("1.2.3".parse::<Amount>().is_err());
        assert!("1000000001".parse::<Amount>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for units in [0, 1, -1, 95_000, 1_000_000, -1_234_567] {
            let amount = Amount::new(units);
            assert_eq!(amount.to_string().parse::<Amount>().unwrap(), amount);
        }
    }

    #[test]
    fn tax_rate_truncates_toward_zero() {
        let rate = TaxRate::from_bps(500).unwrap();
        assert_eq!(rate.apply(Amount::from_whole(10)).units(), 5_000);
        // 33.3333 * 5% = 1.666665 -> truncated to 1.6666
        assert_eq!(rate.apply(Amount::new(333_333)).units(), 16_666);
        // Below the smallest representable slice the tax vanishes.
        assert_eq!(rate.apply(Amount::new(1)).units(), 0);
    }

    #[test]
    fn tax_rate_rejects_above_100_percent() {
        assert!(TaxRate::from_bps(10_001).is_err());
        assert!(TaxRate::from_bps(10_000).is_ok());
    }
}
