//! Fixing board: latest status per tenor and the confirm gate.

use dashmap::DashMap;
use nibor_common::Tenor;
use nibor_recon::ReconStatus;
use tracing::debug;

/// Latest reconciliation status per tenor.
pub struct FixingBoard {
    statuses: DashMap<Tenor, ReconStatus>,
    confirm_tenors: Vec<Tenor>,
}

impl FixingBoard {
    /// Create a board gating on the given tenors.
    pub fn new(confirm_tenors: Vec<Tenor>) -> Self {
        Self {
            statuses: DashMap::new(),
            confirm_tenors,
        }
    }

    /// Record the status of a tenor, replacing any earlier one.
    pub fn record(&self, tenor: Tenor, status: ReconStatus) -> Option<ReconStatus> {
        let previous = self.statuses.insert(tenor, status);
        debug!(tenor = %tenor, status = %status, previous = ?previous, "Board updated");
        previous
    }

    pub fn status(&self, tenor: Tenor) -> Option<ReconStatus> {
        self.statuses.get(&tenor).map(|s| *s)
    }

    /// Every confirm tenor has been evaluated and matched.
    pub fn ready_to_confirm(&self) -> bool {
        self.outstanding().is_empty()
    }

    /// Confirm tenors that are not evaluated yet or not matched.
    pub fn outstanding(&self) -> Vec<Tenor> {
        self.confirm_tenors
            .iter()
            .copied()
            .filter(|t| !self.status(*t).map_or(false, |s| s.is_matched()))
            .collect()
    }

    /// Recorded statuses, shortest tenor first.
    pub fn entries(&self) -> Vec<(Tenor, ReconStatus)> {
        let mut entries: Vec<_> = self.statuses.iter().map(|e| (*e.key(), *e.value())).collect();
        entries.sort_by_key(|(tenor, _)| *tenor);
        entries
    }

    pub fn clear(&self) {
        self.statuses.clear();
    }
}

impl Default for FixingBoard {
    fn default() -> Self {
        Self::new(Tenor::CONFIRM_SET.to_vec())
    }
}
