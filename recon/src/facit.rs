//! Standard facit criteria for the NIBOR contribution of a tenor.

use nibor_common::{optional_decimal, NiborError, Result, Tenor};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::criterion::Criterion;

/// Decimals the contribution cells are reconciled at.
pub const CONTRIBUTION_DECIMALS: u32 = 2;

/// Workbook cells holding the facit values of a tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacitCells {
    /// Final rate at 4 decimals.
    pub final_rate: &'static str,
    /// Contribution input row, 2 decimals.
    pub contribution_input: &'static str,
    /// Contribution output row, 2 decimals.
    pub contribution_output: &'static str,
}

impl FacitCells {
    /// Cells for a confirmable tenor; `None` for tenors without a facit.
    pub fn for_tenor(tenor: Tenor) -> Option<Self> {
        let (final_rate, contribution_input, contribution_output) = match tenor {
            Tenor::OneWeek => return None,
            Tenor::OneMonth => ("Z30", "AA7", "AA30"),
            Tenor::TwoMonths => ("Z31", "AA8", "AA31"),
            Tenor::ThreeMonths => ("Z32", "AA9", "AA32"),
            Tenor::SixMonths => ("Z33", "AA10", "AA33"),
        };
        Some(Self {
            final_rate,
            contribution_input,
            contribution_output,
        })
    }
}

/// Expected values read from the facit workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacitValues {
    pub final_rate: Option<Decimal>,
    pub contribution_input: Option<Decimal>,
    pub contribution_output: Option<Decimal>,
}

/// Inbound facit record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacitRecord {
    #[serde(default)]
    pub final_rate: Option<f64>,
    #[serde(default)]
    pub contribution_input: Option<f64>,
    #[serde(default)]
    pub contribution_output: Option<f64>,
}

impl TryFrom<FacitRecord> for FacitValues {
    type Error = NiborError;

    fn try_from(record: FacitRecord) -> Result<Self> {
        Ok(Self {
            final_rate: optional_decimal("facit.final_rate", record.final_rate)?,
            contribution_input: optional_decimal(
                "facit.contribution_input",
                record.contribution_input,
            )?,
            contribution_output: optional_decimal(
                "facit.contribution_output",
                record.contribution_output,
            )?,
        })
    }
}

/// Build the ordered criteria comparing a computed final rate to the facit.
///
/// The final-rate criterion compares unrounded values within `tolerance`;
/// the contribution criteria compare both sides at two decimals exactly.
pub fn facit_criteria(
    tenor: Tenor,
    final_rate: Option<Decimal>,
    facit: &FacitValues,
    tolerance: Decimal,
) -> Result<Vec<Criterion>> {
    let Some(cells) = FacitCells::for_tenor(tenor) else {
        return Ok(Vec::new());
    };

    let at_two = |v: Option<Decimal>| v.map(|v| v.round_dp(CONTRIBUTION_DECIMALS));

    Ok(vec![
        Criterion::new("Final rate", final_rate, facit.final_rate)
            .with_description("4 decimals")
            .with_source(cells.final_rate)
            .with_tolerance(tolerance)?,
        Criterion::new(
            "Contribution (input)",
            at_two(final_rate),
            at_two(facit.contribution_input),
        )
        .with_description("2 decimals (input)")
        .with_source(cells.contribution_input)
        .with_tolerance(Decimal::ZERO)?,
        Criterion::new(
            "Contribution (output)",
            at_two(final_rate),
            at_two(facit.contribution_output),
        )
        .with_description("2 decimals (output)")
        .with_source(cells.contribution_output)
        .with_tolerance(Decimal::ZERO)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::DEFAULT_TOLERANCE;
    use rust_decimal_macros::dec;

    fn facit(final_rate: Decimal, input: Decimal, output: Decimal) -> FacitValues {
        FacitValues {
            final_rate: Some(final_rate),
            contribution_input: Some(input),
            contribution_output: Some(output),
        }
    }

    #[test]
    fn test_cells_per_tenor() {
        let cells = FacitCells::for_tenor(Tenor::ThreeMonths).unwrap();
        assert_eq!(cells.final_rate, "Z32");
        assert_eq!(cells.contribution_input, "AA9");
        assert_eq!(cells.contribution_output, "AA32");
        assert!(FacitCells::for_tenor(Tenor::OneWeek).is_none());
    }

    #[test]
    fn test_all_criteria_match() {
        let criteria = facit_criteria(
            Tenor::OneMonth,
            Some(dec!(4.31504)),
            &facit(dec!(4.3150), dec!(4.32), dec!(4.3151)),
            DEFAULT_TOLERANCE,
        )
        .unwrap();

        assert_eq!(criteria.len(), 3);
        assert!(criteria.iter().all(Criterion::matched));
        assert_eq!(criteria[0].source(), Some("Z30"));
        assert_eq!(criteria[1].computed_value(), Some(dec!(4.32)));
    }

    #[test]
    fn test_two_decimal_rounding_mismatch() {
        let criteria = facit_criteria(
            Tenor::SixMonths,
            Some(dec!(4.3149)),
            &facit(dec!(4.3149), dec!(4.32), dec!(4.31)),
            DEFAULT_TOLERANCE,
        )
        .unwrap();

        assert!(criteria[0].matched());
        // 4.3149 -> 4.31 vs 4.32
        assert!(!criteria[1].matched());
        assert!(criteria[2].matched());
    }

    #[test]
    fn test_missing_facit_values() {
        let criteria = facit_criteria(
            Tenor::TwoMonths,
            Some(dec!(4.3)),
            &FacitValues::default(),
            DEFAULT_TOLERANCE,
        )
        .unwrap();

        assert_eq!(criteria.len(), 3);
        assert!(criteria.iter().all(|c| !c.matched()));
    }

    #[test]
    fn test_one_week_has_no_criteria() {
        let criteria = facit_criteria(
            Tenor::OneWeek,
            Some(dec!(4.3)),
            &facit(dec!(4.3), dec!(4.3), dec!(4.3)),
            DEFAULT_TOLERANCE,
        )
        .unwrap();
        assert!(criteria.is_empty());
    }
}
