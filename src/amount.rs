//! Sales amount type with a 10-digit ceiling.
//!
//! Amounts are non-negative integers. Every running total must stay strictly
//! below [`Amount::CEILING`]; reaching it aborts the run.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A non-negative sales amount or accumulated total.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use sales_aggregator::Amount;
///
/// let total = Amount::ZERO.checked_accumulate(Amount::from_str("100").unwrap());
/// assert_eq!(total.unwrap().to_string(), "100");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(transparent)]
pub struct Amount(u64);

/// Why a piece of amount text was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// Empty, signed, fractional or otherwise not plain ASCII digits.
    #[error("amount {0:?} is not a plain decimal number")]
    Malformed(String),

    /// All digits, but too large to represent; always above the ceiling.
    #[error("amount {0:?} is out of range")]
    OutOfRange(String),
}

impl Amount {
    /// Maximum number of digits a total may have.
    pub const MAX_DIGITS: u32 = 10;

    /// First value that is no longer allowed as a total.
    pub const CEILING: u64 = 10u64.pow(Self::MAX_DIGITS);

    /// Zero value.
    pub const ZERO: Self = Amount(0);

    pub fn new(value: u64) -> Self {
        Amount(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Adds `rhs` to this total.
    ///
    /// Returns `None` if the result would reach or exceed [`Amount::CEILING`].
    pub fn checked_accumulate(self, rhs: Amount) -> Option<Amount> {
        self.0
            .checked_add(rhs.0)
            .filter(|total| *total < Self::CEILING)
            .map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts one or more ASCII digits and nothing else; no trimming.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_string()));
        }
        s.parse::<u64>()
            .map(Amount)
            .map_err(|_| AmountError::OutOfRange(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
