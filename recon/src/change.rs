//! Movement of a rate against the previous fixing.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Changes smaller than this are shown as flat.
pub const CHANGE_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Direction and size of a rate change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "direction", content = "delta", rename_all = "lowercase")]
pub enum RateChange {
    Up(Decimal),
    Down(Decimal),
    Flat,
}

impl RateChange {
    /// `None` when the difference does not fit a decimal.
    pub fn between(current: Decimal, previous: Decimal) -> Option<Self> {
        let delta = current.checked_sub(previous)?;
        Some(if delta.abs() < CHANGE_THRESHOLD {
            RateChange::Flat
        } else if delta.is_sign_positive() {
            RateChange::Up(delta)
        } else {
            RateChange::Down(delta.abs())
        })
    }

    /// Change against an optional previous value.
    pub fn from_previous(current: Decimal, previous: Option<Decimal>) -> Option<Self> {
        previous.and_then(|p| Self::between(current, p))
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            RateChange::Up(_) => "▲",
            RateChange::Down(_) => "▼",
            RateChange::Flat => "●",
        }
    }
}

impl fmt::Display for RateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateChange::Up(d) => write!(f, "{} +{:.2}", self.arrow(), d.round_dp(2)),
            RateChange::Down(d) => write!(f, "{} -{:.2}", self.arrow(), d.round_dp(2)),
            RateChange::Flat => write!(f, "{} 0.00", self.arrow()),
        }
    }
}
