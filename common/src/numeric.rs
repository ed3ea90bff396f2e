//! Validated conversion of inbound floating point values into decimals.

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{NiborError, Result};

/// Fractional digits used when rates are displayed.
pub const DISPLAY_DECIMALS: u32 = 4;

/// Convert an inbound `f64` into a `Decimal`.
///
/// Non-finite values are rejected rather than clamped. The conversion goes
/// through the shortest round-trip representation, so `4.1_f64` becomes
/// exactly `4.1`. Digits past 28 decimal places are rounded away; a
/// non-zero value that would round to zero is out of range.
pub fn decimal_from_f64(field: &str, value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(NiborError::NonFiniteValue {
            field: field.to_string(),
        });
    }

    let out_of_range = || NiborError::OutOfRange {
        field: field.to_string(),
        value,
    };

    let decimal = Decimal::from_str(&value.to_string()).map_err(|_| out_of_range())?;
    if decimal.is_zero() && value != 0.0 {
        return Err(out_of_range());
    }

    Ok(decimal)
}

/// Convert an optional inbound value; `None` stays absent.
pub fn optional_decimal(field: &str, value: Option<f64>) -> Result<Option<Decimal>> {
    value.map(|v| decimal_from_f64(field, v)).transpose()
}

/// Round a value for display.
pub fn round_display(value: Decimal) -> Decimal {
    value.round_dp(DISPLAY_DECIMALS)
}

/// Format an optional rate as a percentage, `—` when absent.
pub fn format_percent(value: Option<Decimal>, decimals: u32) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals as usize, v.round_dp(decimals)),
        None => "—".to_string(),
    }
}
