//! Aggregate reconciliation result and status derivation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::criterion::{Criterion, CriterionOutcome};

/// Overall match status of a tenor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconStatus {
    /// No criteria to evaluate yet.
    Pending,
    /// Every criterion matched.
    Matched,
    /// Some criterion lacks input; none failed outright.
    Warn,
    /// At least one comparison with both values present failed.
    Fail,
}

impl ReconStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReconStatus::Pending => "PENDING",
            ReconStatus::Matched => "MATCHED",
            ReconStatus::Warn => "WARN",
            ReconStatus::Fail => "FAIL",
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, ReconStatus::Matched)
    }
}

impl fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Derive the status of an ordered criteria set.
///
/// Precedence: FAIL over WARN over MATCHED; PENDING only when empty.
pub fn derive_status(criteria: &[Criterion]) -> ReconStatus {
    if criteria.is_empty() {
        return ReconStatus::Pending;
    }

    let outcomes = || criteria.iter().map(Criterion::outcome);

    if outcomes().any(|o| o == CriterionOutcome::Mismatch) {
        ReconStatus::Fail
    } else if outcomes().any(|o| o == CriterionOutcome::MissingInput) {
        ReconStatus::Warn
    } else {
        ReconStatus::Matched
    }
}

/// Reconciliation of one tenor. Immutable once built; a new result
/// replaces the old one on every tenor switch or re-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    criteria: Vec<Criterion>,
    status: ReconStatus,
}

impl ReconciliationResult {
    /// Build a result; criteria keep their insertion order.
    pub fn new(criteria: Vec<Criterion>) -> Self {
        let status = derive_status(&criteria);
        Self { criteria, status }
    }

    /// A result with no criteria, status PENDING.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn status(&self) -> ReconStatus {
        self.status
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Number of matched criteria.
    pub fn passed(&self) -> usize {
        self.criteria.iter().filter(|c| c.matched()).count()
    }

    /// Non-empty and every criterion matched.
    pub fn all_matched(&self) -> bool {
        !self.criteria.is_empty() && self.criteria.iter().all(Criterion::matched)
    }

    /// Any comparison with both values present failed.
    pub fn has_failures(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| c.outcome() == CriterionOutcome::Mismatch)
    }

    /// Any criterion lacks a computed or expected value.
    pub fn has_missing_input(&self) -> bool {
        self.criteria
            .iter()
            .any(|c| c.outcome() == CriterionOutcome::MissingInput)
    }

    /// Any criterion with `matched = false`, for either reason.
    pub fn has_unmatched(&self) -> bool {
        self.criteria.iter().any(|c| !c.matched())
    }

    /// First criterion that carries an expected value.
    pub fn facit_criterion(&self) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.expected_value().is_some())
    }

    /// The headline facit value.
    pub fn facit(&self) -> Option<Decimal> {
        self.facit_criterion().and_then(Criterion::expected_value)
    }

    /// Absolute difference between the headline computed value and facit.
    pub fn delta(&self) -> Option<Decimal> {
        self.facit_criterion().and_then(Criterion::delta)
    }

    /// One line per unmatched criterion, in display order.
    pub fn issues(&self) -> Vec<String> {
        self.criteria.iter().filter_map(Criterion::issue).collect()
    }
}

impl Default for ReconciliationResult {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<Criterion> for ReconciliationResult {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
