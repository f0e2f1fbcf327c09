use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SCALE: i64 = 10_000;
const PRECISION: usize = 4;

/// Monetary value of a transaction or a balance.
/// It is using internally an i64 in order to avoid floating point rounding error,
/// so zero checks and comparisons are exact.
/// The Amount precision is four places past the decimal
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount {
    store: i64,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount parsing error: {0:?}")]
    Parse(String),

    #[error("Overflow error while computing Amount")]
    Overflow,

    #[error("Underflow error while computing Amount")]
    Underflow,
}

impl Amount {
    pub const ZERO: Amount = Amount { store: 0 };

    /// Whole currency units, e.g. `Amount::from_units(100)` is `100.0000`.
    pub fn from_units(units: i64) -> Result<Self, AmountError> {
        units
            .checked_mul(SCALE)
            .map(|store| Amount { store })
            .ok_or(AmountError::Overflow)
    }

    pub fn is_zero(&self) -> bool {
        self.store == 0
    }

    pub fn is_negative(&self) -> bool {
        self.store < 0
    }

    pub fn add(&self, other: &Amount) -> Result<Amount, AmountError> {
        match self.store.checked_add(other.store) {
            Some(total) => Ok(Amount { store: total }),
            None if other.store < 0 => Err(AmountError::Underflow),
            None => Err(AmountError::Overflow),
        }
    }

    pub fn sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        match self.store.checked_sub(other.store) {
            Some(total) => Ok(Amount { store: total }),
            None if other.store < 0 => Err(AmountError::Overflow),
            None => Err(AmountError::Underflow),
        }
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Parse(s.into()));
        }

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };

        // "." alone, "-" alone or a second '.' are not numbers
        if (int_part.is_empty() && frac_part.is_empty())
            || !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Parse(s.into()));
        }

        let units: i64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| AmountError::Parse(s.into()))?
        };

        // Keep four decimal places, extra digits are truncated
        let mut frac = frac_part.chars().take(PRECISION).collect::<String>();
        while frac.len() < PRECISION {
            frac.push('0');
        }
        let fraction: i64 = frac.parse().map_err(|_| AmountError::Parse(s.into()))?;

        let magnitude = units
            .checked_mul(SCALE)
            .and_then(|v| v.checked_add(fraction))
            .ok_or(AmountError::Overflow)?;

        Ok(Amount {
            store: if negative { -magnitude } else { magnitude },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs_val = self.store.unsigned_abs();
        let units = abs_val / SCALE as u64;
        let fraction = abs_val % SCALE as u64;

        if self.store < 0 {
            write!(f, "-{}.{:04}", units, fraction)
        } else {
            write!(f, "{}.{:04}", units, fraction)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
