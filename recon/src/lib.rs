//! NIBOR Reconciliation Engine
//!
//! Derives the published NIBOR rate for a tenor from weighted per-currency
//! implied rates plus a spread, and reconciles computed values against the
//! external facit.
//!
//! # Features
//!
//! - Validated rate snapshots (finite numbers, weights summing to one)
//! - Rate composition with explicit partial-input tracking
//! - Tolerance based criterion matching with a four-state status
//! - Standard facit criteria per tenor
//! - Implied yield from FX forward points and day-over-day rate changes
//!
//! # Example
//!
//! ```rust,ignore
//! use nibor_recon::{FacitValues, RateSnapshot, ReconEngine};
//!
//! let engine = ReconEngine::default();
//! let evaluation = engine.evaluate(snapshot, &FacitValues::default())?;
//!
//! println!("{} {}", evaluation.final_rate().unwrap(), evaluation.result.status());
//! ```

pub mod snapshot;
pub mod composition;
pub mod criterion;
pub mod reconciliation;
pub mod facit;
pub mod engine;
pub mod implied;
pub mod change;

pub use snapshot::{
    FxInputRecord, FxInputs, RateSnapshot, SnapshotRecord, Weights, WEIGHT_SUM_TOLERANCE,
};
pub use composition::{compose, Composition, Contribution};
pub use criterion::{values_match, Criterion, CriterionOutcome, CriterionRecord, DEFAULT_TOLERANCE};
pub use reconciliation::{derive_status, ReconStatus, ReconciliationResult};
pub use facit::{facit_criteria, FacitCells, FacitRecord, FacitValues, CONTRIBUTION_DECIMALS};
pub use engine::{Evaluation, ReconEngine, ReconEngineConfig};
pub use implied::implied_yield;
pub use change::{RateChange, CHANGE_THRESHOLD};
