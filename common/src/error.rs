//! Error types for the NIBOR reconciliation core.

use crate::{Currency, Tenor};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type. Only malformed input is an error; missing criterion
/// data and stale re-runs are ordinary states.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NiborError {
    /// A numeric field was present but NaN or infinite.
    #[error("Non-finite value in field {field}")]
    NonFiniteValue { field: String },

    /// A numeric field does not fit a decimal.
    #[error("Value {value} out of range in field {field}")]
    OutOfRange { field: String, value: f64 },

    /// Arithmetic on accepted values left the decimal range.
    #[error("Arithmetic overflow computing {field}")]
    Overflow { field: String },

    /// A basket weight outside [0, 1].
    #[error("Weight {weight} for {currency} outside [0, 1]")]
    WeightOutOfRange { currency: Currency, weight: Decimal },

    /// Complete basket weights that do not sum to one.
    #[error("Weights sum to {sum}, expected 1")]
    WeightSumMismatch { sum: Decimal },

    /// Negative comparison tolerance.
    #[error("Invalid tolerance {tolerance} for criterion {criterion}")]
    InvalidTolerance { criterion: String, tolerance: Decimal },

    /// Unrecognised tenor key.
    #[error("Unknown tenor: {0}")]
    UnknownTenor(String),

    /// Unrecognised currency code.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Snapshot handed to the session under the wrong tenor key.
    #[error("Tenor mismatch: expected {expected}, got {actual}")]
    TenorMismatch { expected: Tenor, actual: Tenor },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl NiborError {
    /// Stable error code for logs and outbound payloads.
    pub fn error_code(&self) -> &'static str {
        match self {
            NiborError::NonFiniteValue { .. } => "NON_FINITE_VALUE",
            NiborError::OutOfRange { .. } => "OUT_OF_RANGE",
            NiborError::Overflow { .. } => "ARITHMETIC_OVERFLOW",
            NiborError::WeightOutOfRange { .. } => "WEIGHT_OUT_OF_RANGE",
            NiborError::WeightSumMismatch { .. } => "WEIGHT_SUM_MISMATCH",
            NiborError::InvalidTolerance { .. } => "INVALID_TOLERANCE",
            NiborError::UnknownTenor(_) => "UNKNOWN_TENOR",
            NiborError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            NiborError::TenorMismatch { .. } => "TENOR_MISMATCH",
            NiborError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether the error stems from malformed upstream data.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            NiborError::NonFiniteValue { .. }
                | NiborError::OutOfRange { .. }
                | NiborError::Overflow { .. }
                | NiborError::WeightOutOfRange { .. }
                | NiborError::WeightSumMismatch { .. }
                | NiborError::InvalidTolerance { .. }
        )
    }
}

/// Result type alias for NIBOR operations.
pub type Result<T> = std::result::Result<T, NiborError>;
