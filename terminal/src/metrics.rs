//! Run metrics.

use nibor_recon::ReconStatus;

/// Counters for one terminal run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    /// Views published.
    pub shows: u64,
    /// Re-runs requested by the panel.
    pub reruns_requested: u64,
    /// Re-runs answered with a fresh view.
    pub reruns_completed: u64,
    /// Re-runs the source could not answer; the panel kept stale data.
    pub stale_reruns: u64,
    pub pending: u64,
    pub matched: u64,
    pub warned: u64,
    pub failed: u64,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a published view.
    pub fn record_show(&mut self, status: ReconStatus) {
        self.shows += 1;
        match status {
            ReconStatus::Pending => self.pending += 1,
            ReconStatus::Matched => self.matched += 1,
            ReconStatus::Warn => self.warned += 1,
            ReconStatus::Fail => self.failed += 1,
        }
    }

    pub fn record_rerun_requested(&mut self) {
        self.reruns_requested += 1;
    }

    pub fn record_rerun_completed(&mut self) {
        self.reruns_completed += 1;
    }

    pub fn record_stale_rerun(&mut self) {
        self.stale_reruns += 1;
    }

    /// Share of requested re-runs that produced a fresh view.
    pub fn rerun_completion_rate(&self) -> f64 {
        if self.reruns_requested == 0 {
            return 0.0;
        }

        self.reruns_completed as f64 / self.reruns_requested as f64
    }
}
