//! Reconciliation engine tying composition and criteria together.

use nibor_common::{Result, Tenor};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::composition::Composition;
use crate::criterion::{Criterion, CriterionRecord, DEFAULT_TOLERANCE};
use crate::facit::{facit_criteria, FacitValues};
use crate::reconciliation::ReconciliationResult;
use crate::snapshot::{RateSnapshot, SnapshotRecord, WEIGHT_SUM_TOLERANCE};

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone)]
pub struct ReconEngineConfig {
    /// Tolerance of the final-rate criterion.
    pub default_tolerance: Decimal,
    /// Allowed deviation of a complete weight set from 1.
    pub weight_sum_tolerance: Decimal,
}

impl Default for ReconEngineConfig {
    fn default() -> Self {
        Self {
            default_tolerance: DEFAULT_TOLERANCE,
            weight_sum_tolerance: WEIGHT_SUM_TOLERANCE,
        }
    }
}

/// A composed snapshot together with its reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub snapshot: RateSnapshot,
    pub result: ReconciliationResult,
}

impl Evaluation {
    pub fn tenor(&self) -> Tenor {
        self.snapshot.tenor()
    }

    pub fn final_rate(&self) -> Option<Decimal> {
        self.snapshot.final_rate()
    }

    pub fn composition(&self) -> Option<&Composition> {
        self.snapshot.composition()
    }

    pub fn into_parts(self) -> (RateSnapshot, ReconciliationResult) {
        (self.snapshot, self.result)
    }
}

/// Stateless engine; every call produces a fresh evaluation.
#[derive(Debug, Clone, Default)]
pub struct ReconEngine {
    config: ReconEngineConfig,
}

impl ReconEngine {
    pub fn new(config: ReconEngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconEngineConfig {
        &self.config
    }

    /// Validate an inbound snapshot record.
    pub fn snapshot_from_record(&self, record: SnapshotRecord) -> Result<RateSnapshot> {
        record.into_snapshot(self.config.weight_sum_tolerance)
    }

    /// Validate inbound criterion records, keeping their order.
    pub fn criteria_from_records(&self, records: Vec<CriterionRecord>) -> Result<Vec<Criterion>> {
        records.into_iter().map(Criterion::try_from).collect()
    }

    /// Compose the snapshot and reconcile it against the facit workbook.
    #[instrument(skip_all, fields(tenor = %snapshot.tenor()))]
    pub fn evaluate(&self, snapshot: RateSnapshot, facit: &FacitValues) -> Result<Evaluation> {
        let snapshot = snapshot.composed()?;
        let criteria = facit_criteria(
            snapshot.tenor(),
            snapshot.final_rate(),
            facit,
            self.config.default_tolerance,
        )?;
        Ok(self.finish(snapshot, criteria))
    }

    /// Compose the snapshot and reconcile it against supplied criteria.
    #[instrument(skip_all, fields(tenor = %snapshot.tenor()))]
    pub fn reconcile(
        &self,
        snapshot: RateSnapshot,
        criteria: Vec<Criterion>,
    ) -> Result<Evaluation> {
        Ok(self.finish(snapshot.composed()?, criteria))
    }

    fn finish(&self, snapshot: RateSnapshot, criteria: Vec<Criterion>) -> Evaluation {
        let result = ReconciliationResult::new(criteria);

        if let Some(composition) = snapshot.composition() {
            if composition.partial {
                debug!(
                    missing = ?composition.missing_currencies(),
                    "Composition used partial inputs"
                );
            }
        }

        info!(
            status = %result.status(),
            passed = result.passed(),
            total = result.len(),
            "Reconciliation completed"
        );

        Evaluation { snapshot, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::ReconStatus;
    use crate::snapshot::Weights;
    use nibor_common::Currency;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn snapshot(tenor: Tenor) -> RateSnapshot {
        RateSnapshot::new(
            tenor,
            BTreeMap::from([
                (Currency::Eur, dec!(4.10)),
                (Currency::Usd, dec!(4.00)),
                (Currency::Nok, dec!(4.52)),
            ]),
            Weights::new(BTreeMap::from([
                (Currency::Eur, dec!(0.4)),
                (Currency::Usd, dec!(0.35)),
                (Currency::Nok, dec!(0.25)),
            ]))
            .unwrap(),
            tenor.default_spread(),
        )
    }

    #[test]
    fn test_evaluate_matched() {
        let engine = ReconEngine::default();
        let facit = FacitValues {
            final_rate: Some(dec!(4.37)),
            contribution_input: Some(dec!(4.37)),
            contribution_output: Some(dec!(4.37)),
        };

        let evaluation = engine.evaluate(snapshot(Tenor::OneMonth), &facit).unwrap();

        // 1.64 + 1.40 + 1.13 + 0.20
        assert_eq!(evaluation.final_rate(), Some(dec!(4.37)));
        assert_eq!(evaluation.result.status(), ReconStatus::Matched);
    }

    #[test]
    fn test_evaluate_missing_facit_warns() {
        let engine = ReconEngine::default();
        let facit = FacitValues {
            final_rate: Some(dec!(4.37)),
            ..Default::default()
        };

        let evaluation = engine.evaluate(snapshot(Tenor::ThreeMonths), &facit).unwrap();

        assert_eq!(evaluation.result.status(), ReconStatus::Warn);
        assert_eq!(evaluation.result.issues().len(), 2);
    }

    #[test]
    fn test_evaluate_one_week_pending() {
        let engine = ReconEngine::default();
        let evaluation = engine
            .evaluate(snapshot(Tenor::OneWeek), &FacitValues::default())
            .unwrap();

        assert_eq!(evaluation.final_rate(), Some(dec!(4.32)));
        assert_eq!(evaluation.result.status(), ReconStatus::Pending);
    }

    #[test]
    fn test_reconcile_with_supplied_criteria() {
        let engine = ReconEngine::default();
        let criteria = engine
            .criteria_from_records(vec![CriterionRecord {
                name: "Final rate".to_string(),
                description: None,
                source: None,
                computed_value: Some(4.2525),
                expected_value: Some(4.2520),
                tolerance: Some(0.0001),
            }])
            .unwrap();

        let evaluation = engine
            .reconcile(snapshot(Tenor::OneMonth), criteria)
            .unwrap();

        assert_eq!(evaluation.result.status(), ReconStatus::Fail);
        assert!(evaluation.composition().is_some());
    }

    #[test]
    fn test_custom_tolerance() {
        let engine = ReconEngine::new(ReconEngineConfig {
            default_tolerance: dec!(0.01),
            ..Default::default()
        });
        let facit = FacitValues {
            final_rate: Some(dec!(4.375)),
            contribution_input: Some(dec!(4.37)),
            contribution_output: Some(dec!(4.37)),
        };

        let evaluation = engine.evaluate(snapshot(Tenor::TwoMonths), &facit).unwrap();

        assert_eq!(evaluation.result.status(), ReconStatus::Matched);
    }

    #[test]
    fn test_overflow_surfaces_as_error() {
        let engine = ReconEngine::default();
        let record: SnapshotRecord = serde_json::from_str(
            r#"{"tenor": "1m", "implied_rates": {"EUR": 7e28, "USD": 7e28}, "weights": {"EUR": 1.0, "USD": 1.0}}"#,
        )
        .unwrap();
        let snapshot = engine.snapshot_from_record(record).unwrap();

        let err = engine.evaluate(snapshot, &FacitValues::default()).unwrap_err();

        assert!(err.is_malformed_input());
        assert_eq!(err.error_code(), "ARITHMETIC_OVERFLOW");
    }
}
