//! Single computed-vs-expected comparisons.

use nibor_common::{optional_decimal, round_display, NiborError, Result, DISPLAY_DECIMALS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Absolute tolerance used when a criterion does not specify one.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// How a criterion resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionOutcome {
    /// Both values present and within tolerance.
    Matched,
    /// Both values present, outside tolerance.
    Mismatch,
    /// Computed or expected value absent.
    MissingInput,
}

/// One named comparison between an application value and the facit.
///
/// `matched` is derived from the inputs and recomputed on every change;
/// there is no way to set it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criterion {
    name: String,
    description: Option<String>,
    /// Where the expected value was read from, e.g. a workbook cell.
    source: Option<String>,
    computed_value: Option<Decimal>,
    expected_value: Option<Decimal>,
    tolerance: Decimal,
    matched: bool,
}

impl Criterion {
    /// Create a criterion with the default tolerance.
    pub fn new(
        name: impl Into<String>,
        computed_value: Option<Decimal>,
        expected_value: Option<Decimal>,
    ) -> Self {
        let mut criterion = Self {
            name: name.into(),
            description: None,
            source: None,
            computed_value,
            expected_value,
            tolerance: DEFAULT_TOLERANCE,
            matched: false,
        };
        criterion.refresh();
        criterion
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Override the tolerance. Negative tolerances are rejected.
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Result<Self> {
        if tolerance < Decimal::ZERO {
            return Err(NiborError::InvalidTolerance {
                criterion: self.name,
                tolerance,
            });
        }
        self.tolerance = tolerance;
        self.refresh();
        Ok(self)
    }

    pub fn set_computed_value(&mut self, value: Option<Decimal>) {
        self.computed_value = value;
        self.refresh();
    }

    pub fn set_expected_value(&mut self, value: Option<Decimal>) {
        self.expected_value = value;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.matched = values_match(self.computed_value, self.expected_value, self.tolerance);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn computed_value(&self) -> Option<Decimal> {
        self.computed_value
    }

    pub fn expected_value(&self) -> Option<Decimal> {
        self.expected_value
    }

    pub fn tolerance(&self) -> Decimal {
        self.tolerance
    }

    pub fn matched(&self) -> bool {
        self.matched
    }

    /// Three-way outcome distinguishing a failed comparison from missing data.
    pub fn outcome(&self) -> CriterionOutcome {
        if self.computed_value.is_none() || self.expected_value.is_none() {
            CriterionOutcome::MissingInput
        } else if self.matched {
            CriterionOutcome::Matched
        } else {
            CriterionOutcome::Mismatch
        }
    }

    /// Absolute difference, when both values are present and the
    /// difference fits a decimal.
    pub fn delta(&self) -> Option<Decimal> {
        match (self.computed_value, self.expected_value) {
            (Some(computed), Some(expected)) => computed.checked_sub(expected).map(|d| d.abs()),
            _ => None,
        }
    }

    /// Label used in issue lines: the source when known, else the name.
    pub fn label(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Human-readable reason the criterion did not match.
    pub fn issue(&self) -> Option<String> {
        match (self.outcome(), self.computed_value, self.expected_value) {
            (CriterionOutcome::Matched, _, _) => None,
            (CriterionOutcome::Mismatch, Some(computed), Some(expected)) => Some(format!(
                "{}: {:.*} ≠ {:.*}",
                self.label(),
                DISPLAY_DECIMALS as usize,
                round_display(computed),
                DISPLAY_DECIMALS as usize,
                round_display(expected)
            )),
            (_, None, None) => Some(format!("{}: computed and expected values missing", self.label())),
            (_, None, Some(_)) => Some(format!("{}: computed value missing", self.label())),
            _ => Some(format!("{}: expected value missing", self.label())),
        }
    }
}

/// Matching rule: both present and `|computed - expected| <= tolerance`.
///
/// A difference too large for a decimal is beyond any tolerance.
pub fn values_match(
    computed: Option<Decimal>,
    expected: Option<Decimal>,
    tolerance: Decimal,
) -> bool {
    match (computed, expected) {
        (Some(computed), Some(expected)) => computed
            .checked_sub(expected)
            .map_or(false, |diff| diff.abs() <= tolerance),
        _ => false,
    }
}

/// Inbound criterion record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub computed_value: Option<f64>,
    #[serde(default)]
    pub expected_value: Option<f64>,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl TryFrom<CriterionRecord> for Criterion {
    type Error = NiborError;

    fn try_from(record: CriterionRecord) -> Result<Self> {
        let field = |suffix: &str| format!("criteria.{}.{}", record.name, suffix);
        let computed = optional_decimal(&field("computed_value"), record.computed_value)?;
        let expected = optional_decimal(&field("expected_value"), record.expected_value)?;
        let tolerance = optional_decimal(&field("tolerance"), record.tolerance)?
            .unwrap_or(DEFAULT_TOLERANCE);

        let mut criterion = Criterion::new(record.name, computed, expected).with_tolerance(tolerance)?;
        if let Some(description) = record.description {
            criterion = criterion.with_description(description);
        }
        if let Some(source) = record.source {
            criterion = criterion.with_source(source);
        }
        Ok(criterion)
    }
}
