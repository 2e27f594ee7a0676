//! Money type for representing monetary values.
//!
//! Amounts are held as integer paisa so that line totals, delivery charges
//! and discounts never pick up floating-point drift. The backend speaks
//! decimal strings (`"1500.00"`), so the serde representation is the same
//! decimal string.

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Nepalese rupee.
    #[default]
    NPR,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::NPR => "NPR",
        }
    }

    /// Prefix used on every price label.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::NPR => "Rs.",
        }
    }

    pub fn decimal_places(&self) -> u32 {
        2
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value.
///
/// Serializes as a two-decimal string and deserializes from either a
/// decimal string or a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in paisa (1/100 of a rupee).
    pub amount_paisa: i64,
}

impl Money {
    pub const ZERO: Money = Money { amount_paisa: 0 };

    pub fn new(amount_paisa: i64) -> Self {
        Self { amount_paisa }
    }

    /// Whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self::new(rupees * 100)
    }

    /// Parse a decimal amount such as `"1500"`, `"1500.5"` or `"-20.25"`.
    ///
    /// Fractions longer than two digits are rounded half-up on the third
    /// digit.
    ///
    /// ```
    /// use shop_commerce::money::Money;
    /// assert_eq!(Money::parse_decimal("49.99").unwrap().amount_paisa, 4999);
    /// ```
    pub fn parse_decimal(input: &str) -> Result<Self, CommerceError> {
        let invalid = || CommerceError::InvalidAmount(input.to_string());
        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let rupees: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };

        let mut frac_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tens = frac_digits.next().unwrap_or(0);
        let ones = frac_digits.next().unwrap_or(0);
        let round_up = frac_digits.next().map(|d| d >= 5).unwrap_or(false);

        let paisa = rupees
            .checked_mul(100)
            .and_then(|p| p.checked_add(tens * 10 + ones + i64::from(round_up)))
            .ok_or(CommerceError::Overflow)?;

        Ok(Self::new(if negative { -paisa } else { paisa }))
    }

    pub fn is_zero(&self) -> bool {
        self.amount_paisa == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount_paisa > 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount_paisa < 0
    }

    /// Backend wire format, e.g. `"1500.50"`.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.amount_paisa < 0 { "-" } else { "" };
        let abs = self.amount_paisa.unsigned_abs();
        format!("{}{}.{:02}", sign, abs / 100, abs % 100)
    }

    /// Convert to a float, for display math only.
    pub fn to_decimal(&self) -> f64 {
        self.amount_paisa as f64 / 100.0
    }

    /// Format for display (e.g., "Rs. 1500.00").
    pub fn display(&self) -> String {
        format!("{} {}", Currency::NPR.symbol(), self.to_decimal_string())
    }

    pub fn try_add(&self, other: &Money) -> Result<Money, CommerceError> {
        self.amount_paisa
            .checked_add(other.amount_paisa)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    pub fn try_subtract(&self, other: &Money) -> Result<Money, CommerceError> {
        self.amount_paisa
            .checked_sub(other.amount_paisa)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    /// Multiply by a quantity.
    pub fn try_multiply(&self, factor: i64) -> Result<Money, CommerceError> {
        self.amount_paisa
            .checked_mul(factor)
            .map(Money::new)
            .ok_or(CommerceError::Overflow)
    }

    /// Calculate a percentage of this amount, rounded to the nearest paisa.
    pub fn percentage(&self, percent: f64) -> Money {
        Money::new((self.amount_paisa as f64 * percent / 100.0).round() as i64)
    }

    /// Sum an iterator of Money values.
    pub fn try_sum<'a>(mut iter: impl Iterator<Item = &'a Money>) -> Result<Money, CommerceError> {
        iter.try_fold(Money::ZERO, |acc, m| acc.try_add(m))
    }
}

impl Add for Money {
    type Output = Money;

    /// Saturating; use `try_add` where overflow must be reported.
    fn add(self, other: Money) -> Money {
        Money::new(self.amount_paisa.saturating_add(other.amount_paisa))
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::new(self.amount_paisa.saturating_sub(other.amount_paisa))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl std::str::FromStr for Money {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse_decimal(s)
    }
}

impl Serialize for Money {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireAmount {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = match WireAmount::deserialize(deserializer)? {
            WireAmount::Text(s) => s,
            WireAmount::Number(n) => n.to_string(),
        };
        Money::parse_decimal(&raw).map_err(serde::de::Error::custom)
    }
}
