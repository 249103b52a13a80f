//! Fixed-point money amounts.
//!
//! Amounts are stored and summed as integer cents. They are only converted to
//! floating point when serialized for a client.

use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Error;

const CENTS_PER_UNIT: i64 = 100;

/// The largest amount a single record may hold: 100 billion in cents.
///
/// Sums of realistic record counts stay far below `i64::MAX`, and every
/// amount up to this bound converts to `f64` and back without loss.
pub const MAX_CENTS: i64 = 10_000_000_000_000;

/// A non-negative amount of money in integer cents.
///
/// Whether an amount is money earned or money spent is decided by the kind of
/// transaction it belongs to, so the amount itself never carries a sign.
///
/// # Examples
///
/// ```
/// use dinero::Amount;
///
/// let amount: Amount = "12.5".parse().unwrap();
/// assert_eq!(amount.cents(), 1250);
/// assert_eq!(amount.to_string(), "12.50");
/// assert!("-1".parse::<Amount>().is_err());
/// assert!("1.005".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// An amount of zero.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from integer cents.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `cents` is negative or greater than
    /// [MAX_CENTS].
    pub fn from_cents(cents: i64) -> Result<Self, Error> {
        if cents < 0 {
            return Err(Error::InvalidAmount(format!(
                "amounts cannot be negative, got {cents} cents"
            )));
        }

        if cents > MAX_CENTS {
            return Err(Error::InvalidAmount(format!(
                "amounts cannot exceed {}, got {cents} cents",
                Amount(MAX_CENTS)
            )));
        }

        Ok(Self(cents))
    }

    /// The amount in integer cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    fn as_f64(&self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / CENTS_PER_UNIT,
            self.0 % CENTS_PER_UNIT
        )
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || Error::InvalidAmount(format!("\"{s}\" is not a valid amount"));

        if text.starts_with('-') {
            return Err(Error::InvalidAmount(format!(
                "amounts cannot be negative, got \"{s}\""
            )));
        }

        let (whole, fraction) = match text.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (text, ""),
        };

        let is_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(fraction) {
            return Err(invalid());
        }

        if fraction.len() > 2 {
            return Err(Error::InvalidAmount(format!(
                "\"{s}\" has more than two decimal places"
            )));
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(CENTS_PER_UNIT)
            .and_then(|cents| cents.checked_add(fraction_cents))
            .filter(|&cents| cents <= MAX_CENTS)
            .ok_or_else(|| {
                Error::InvalidAmount(format!(
                    "\"{s}\" is too large, amounts cannot exceed {}",
                    Amount(MAX_CENTS)
                ))
            })?;

        Ok(Amount(cents))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Clients may send amounts as JSON numbers or as decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = match RawAmount::deserialize(deserializer)? {
            RawAmount::Number(number) if !number.is_finite() => {
                return Err(de::Error::custom(format!("{number} is not a valid amount")));
            }
            // The shortest round-trip representation keeps the decimal digits
            // the client actually wrote.
            RawAmount::Number(number) => number.to_string(),
            RawAmount::Text(text) => text,
        };

        text.parse().map_err(de::Error::custom)
    }
}

/// The signed difference between money earned and money spent, in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Balance(i64);

impl Balance {
    /// Money earned minus money spent.
    pub fn net(income: Amount, expense: Amount) -> Self {
        Self(income.0.saturating_sub(expense.0))
    }

    /// The balance in integer cents.
    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl Serialize for Balance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.0 as f64 / CENTS_PER_UNIT as f64)
    }
}
