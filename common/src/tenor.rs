//! Tenor keys for the NIBOR fixing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NiborError;

/// A maturity bucket of the reference rate.
///
/// Serialized with its lowercase key (`"1w"`, `"1m"`, ...), displayed in
/// upper case (`1W`, `1M`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tenor {
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "2m")]
    TwoMonths,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
}

impl Tenor {
    /// All tenors, shortest first.
    pub const ALL: [Tenor; 5] = [
        Tenor::OneWeek,
        Tenor::OneMonth,
        Tenor::TwoMonths,
        Tenor::ThreeMonths,
        Tenor::SixMonths,
    ];

    /// Tenors that must be matched before the fixing can be confirmed.
    pub const CONFIRM_SET: [Tenor; 4] = [
        Tenor::OneMonth,
        Tenor::TwoMonths,
        Tenor::ThreeMonths,
        Tenor::SixMonths,
    ];

    /// Lowercase key used by upstream data (`"1m"`).
    pub fn key(&self) -> &'static str {
        match self {
            Tenor::OneWeek => "1w",
            Tenor::OneMonth => "1m",
            Tenor::TwoMonths => "2m",
            Tenor::ThreeMonths => "3m",
            Tenor::SixMonths => "6m",
        }
    }

    /// Default funding spread in percent.
    pub fn default_spread(&self) -> Decimal {
        match self {
            // 15 bps
            Tenor::OneWeek => Decimal::new(15, 2),
            // 20 bps
            _ => Decimal::new(20, 2),
        }
    }

    /// Whether this tenor is part of the confirm set.
    pub fn is_confirmable(&self) -> bool {
        Self::CONFIRM_SET.contains(self)
    }
}

impl fmt::Display for Tenor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key().to_uppercase())
    }
}

impl FromStr for Tenor {
    type Err = NiborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Tenor::ALL
            .into_iter()
            .find(|t| t.key() == key)
            .ok_or_else(|| NiborError::UnknownTenor(s.to_string()))
    }
}
