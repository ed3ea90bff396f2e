//! Currencies that make up the NIBOR funding basket.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NiborError;

/// A basket currency. Ordering follows the display order EUR, USD, NOK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Eur,
    Usd,
    Nok,
}

impl Currency {
    /// All basket currencies in display order.
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Usd, Currency::Nok];

    /// ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Nok => "NOK",
        }
    }

    /// Label of the basket component this currency contributes.
    pub fn component_label(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR Implied",
            Currency::Usd => "USD Implied",
            Currency::Nok => "NOK ECP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = NiborError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "NOK" => Ok(Currency::Nok),
            _ => Err(NiborError::UnknownCurrency(s.to_string())),
        }
    }
}
