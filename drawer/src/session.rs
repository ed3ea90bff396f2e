//! Tenor session: the single view the panel currently shows.
//!
//! A view is built completely before it is published, then swapped in
//! under one write lock. Readers clone the `Arc` and never observe a
//! half-updated tenor, snapshot and result.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use nibor_common::{NiborError, Result, Tenor};
use nibor_recon::{
    Composition, Contribution, Criterion, RateSnapshot, ReconStatus, ReconciliationResult,
};
use parking_lot::RwLock;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::signal::{LoggingSink, PanelSignal, SignalSink};
use crate::state::PanelState;

/// Immutable tenor, snapshot and result triple published by `show()`.
#[derive(Debug, Clone)]
pub struct TenorView {
    pub tenor: Tenor,
    /// Snapshot with its composition applied.
    pub snapshot: RateSnapshot,
    pub result: ReconciliationResult,
    /// Identifies this publication; a fresh id per `show()`.
    pub run_id: Uuid,
    pub shown_at: DateTime<Utc>,
}

impl TenorView {
    pub fn composition(&self) -> Option<&Composition> {
        self.snapshot.composition()
    }

    pub fn final_rate(&self) -> Option<Decimal> {
        self.snapshot.final_rate()
    }

    pub fn funding_rate(&self) -> Option<Decimal> {
        self.composition().map(|c| c.funding_rate)
    }

    pub fn contributions(&self) -> &[Contribution] {
        self.composition()
            .map(|c| c.contributions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_partial(&self) -> bool {
        self.composition().map_or(false, |c| c.partial)
    }

    pub fn criteria(&self) -> &[Criterion] {
        self.result.criteria()
    }

    pub fn status(&self) -> ReconStatus {
        self.result.status()
    }

    /// Equal observable content, ignoring run id and timestamp.
    pub fn same_content(&self, other: &TenorView) -> bool {
        self.tenor == other.tenor && self.snapshot == other.snapshot && self.result == other.result
    }
}

#[derive(Default)]
struct SessionInner {
    view: Option<Arc<TenorView>>,
    state: PanelState,
}

/// Owner of the currently shown tenor.
pub struct TenorSession {
    inner: RwLock<SessionInner>,
    sink: Arc<dyn SignalSink>,
}

impl TenorSession {
    /// Create a closed session that emits signals to `sink`.
    pub fn new(sink: Arc<dyn SignalSink>) -> Self {
        Self {
            inner: RwLock::new(SessionInner::default()),
            sink,
        }
    }

    /// Create a session whose signals are only logged.
    pub fn with_logging() -> Self {
        Self::new(Arc::new(LoggingSink))
    }

    /// Replace the shown view atomically.
    ///
    /// The snapshot must belong to `tenor`. Composition runs here if the
    /// caller has not done it yet; if it fails the held view is untouched.
    #[instrument(skip_all, fields(tenor = %tenor))]
    pub fn show(
        &self,
        tenor: Tenor,
        snapshot: RateSnapshot,
        result: ReconciliationResult,
    ) -> Result<Arc<TenorView>> {
        if snapshot.tenor() != tenor {
            warn!(actual = %snapshot.tenor(), "Snapshot tenor does not match requested tenor");
            return Err(NiborError::TenorMismatch {
                expected: tenor,
                actual: snapshot.tenor(),
            });
        }

        let view = Arc::new(TenorView {
            tenor,
            snapshot: snapshot.composed()?,
            result,
            run_id: Uuid::now_v7(),
            shown_at: Utc::now(),
        });

        let previous = {
            let mut inner = self.inner.write();
            inner.state = PanelState::Open;
            inner.view.replace(view.clone())
        };

        if let Some(previous) = previous {
            debug!(previous_tenor = %previous.tenor, previous_run = %previous.run_id, "View superseded");
        }

        info!(
            run_id = %view.run_id,
            status = %view.status(),
            final_rate = ?view.final_rate(),
            partial = view.is_partial(),
            "Tenor shown"
        );

        Ok(view)
    }

    /// The shown view, if any.
    pub fn current(&self) -> Option<Arc<TenorView>> {
        self.inner.read().view.clone()
    }

    pub fn current_tenor(&self) -> Option<Tenor> {
        self.inner.read().view.as_ref().map(|v| v.tenor)
    }

    pub fn state(&self) -> PanelState {
        self.inner.read().state
    }

    /// State and view read under the same lock.
    pub fn observe(&self) -> (PanelState, Option<Arc<TenorView>>) {
        let inner = self.inner.read();
        (inner.state, inner.view.clone())
    }

    pub fn is_visible(&self) -> bool {
        self.state().is_visible()
    }

    /// Ask the orchestrator to recompute `tenor`.
    ///
    /// Nothing is recomputed here. The current view stays visible until
    /// the next `show()`; if none arrives it simply stays stale.
    #[instrument(skip_all, fields(tenor = %tenor))]
    pub fn request_rerun(&self, tenor: Tenor) {
        {
            let mut inner = self.inner.write();
            match inner.view.as_ref().map(|v| v.tenor) {
                Some(shown) if shown == tenor => inner.state = PanelState::AwaitingRerun,
                Some(shown) => {
                    debug!(shown = %shown, "Re-run requested for a tenor that is not shown");
                }
                None => debug!("Re-run requested with nothing shown"),
            }
        }

        self.sink.emit(PanelSignal::RerunRequested {
            tenor,
            requested_at: Utc::now(),
        });
    }

    /// Discard the shown view and notify the orchestrator.
    ///
    /// Closing an already closed session is a no-op.
    #[instrument(skip(self))]
    pub fn close(&self) {
        let was_visible = {
            let mut inner = self.inner.write();
            let was_visible = inner.state.is_visible();
            inner.view = None;
            inner.state = PanelState::Closed;
            was_visible
        };

        if was_visible {
            info!("Session closed");
            self.sink.emit(PanelSignal::Closed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::ChannelSink;
    use nibor_common::Currency;
    use nibor_recon::Weights;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn snapshot(tenor: Tenor, nok: Decimal) -> RateSnapshot {
        RateSnapshot::new(
            tenor,
            BTreeMap::from([
                (Currency::Eur, dec!(4.10)),
                (Currency::Usd, dec!(4.00)),
                (Currency::Nok, nok),
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

    fn result(computed: Decimal, expected: Option<Decimal>) -> ReconciliationResult {
        ReconciliationResult::new(vec![Criterion::new("Final rate", Some(computed), expected)])
    }

    fn channel_session() -> (TenorSession, tokio::sync::mpsc::UnboundedReceiver<PanelSignal>) {
        let (sink, rx) = ChannelSink::new();
        (TenorSession::new(Arc::new(sink)), rx)
    }

    #[test]
    fn test_new_session_is_closed() {
        let session = TenorSession::with_logging();
        assert_eq!(session.state(), PanelState::Closed);
        assert!(session.current().is_none());
        assert!(session.current_tenor().is_none());
    }

    #[test]
    fn test_show_publishes_view() {
        let session = TenorSession::with_logging();
        let view = session
            .show(
                Tenor::OneWeek,
                snapshot(Tenor::OneWeek, dec!(4.50)),
                result(dec!(4.315), Some(dec!(4.315))),
            )
            .unwrap();

        assert_eq!(view.final_rate(), Some(dec!(4.315)));
        assert_eq!(view.funding_rate(), Some(dec!(4.165)));
        assert_eq!(view.contributions().len(), 3);
        assert_eq!(view.status(), ReconStatus::Matched);
        assert_eq!(session.current_tenor(), Some(Tenor::OneWeek));
        assert!(session.is_visible());
    }

    #[test]
    fn test_show_rejects_tenor_mismatch() {
        let session = TenorSession::with_logging();
        let err = session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::ThreeMonths, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap_err();

        assert_eq!(err.error_code(), "TENOR_MISMATCH");
        assert!(session.current().is_none());
    }

    #[test]
    fn test_failed_composition_keeps_previous_view() {
        let session = TenorSession::with_logging();
        let shown = session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap();

        let oversized = RateSnapshot::new(
            Tenor::OneMonth,
            BTreeMap::from([(Currency::Eur, Decimal::MAX), (Currency::Usd, Decimal::MAX)]),
            Weights::new(BTreeMap::from([
                (Currency::Eur, Decimal::ONE),
                (Currency::Usd, Decimal::ONE),
            ]))
            .unwrap(),
            dec!(0.20),
        );
        let err = session
            .show(Tenor::OneMonth, oversized, ReconciliationResult::empty())
            .unwrap_err();

        assert_eq!(err.error_code(), "ARITHMETIC_OVERFLOW");
        assert_eq!(session.current().unwrap().run_id, shown.run_id);
    }

    #[test]
    fn test_show_twice_is_idempotent() {
        let session = TenorSession::with_logging();
        let first = session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                result(dec!(4.365), Some(dec!(4.3652))),
            )
            .unwrap();
        let second = session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                result(dec!(4.365), Some(dec!(4.3652))),
            )
            .unwrap();

        assert!(first.same_content(&second));
        assert_eq!(first.final_rate(), second.final_rate());
        assert_eq!(first.status(), second.status());
        assert_ne!(first.run_id, second.run_id);
    }

    #[test]
    fn test_show_replaces_previous_tenor() {
        let session = TenorSession::with_logging();
        let old = session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap();
        session
            .show(
                Tenor::SixMonths,
                snapshot(Tenor::SixMonths, dec!(4.60)),
                ReconciliationResult::empty(),
            )
            .unwrap();

        // Readers holding the old view keep a consistent copy.
        assert_eq!(old.tenor, Tenor::OneMonth);
        assert_eq!(session.current_tenor(), Some(Tenor::SixMonths));
    }

    #[test]
    fn test_request_rerun_signals_and_keeps_view() {
        let (session, mut rx) = channel_session();
        session
            .show(
                Tenor::TwoMonths,
                snapshot(Tenor::TwoMonths, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap();

        session.request_rerun(Tenor::TwoMonths);

        assert_eq!(session.state(), PanelState::AwaitingRerun);
        assert_eq!(session.current_tenor(), Some(Tenor::TwoMonths));
        assert_eq!(rx.try_recv().unwrap().tenor(), Some(Tenor::TwoMonths));

        // A follow-up show clears the stale marker.
        session
            .show(
                Tenor::TwoMonths,
                snapshot(Tenor::TwoMonths, dec!(4.52)),
                ReconciliationResult::empty(),
            )
            .unwrap();
        assert_eq!(session.state(), PanelState::Open);
    }

    #[test]
    fn test_rerun_for_other_tenor_keeps_state() {
        let (session, mut rx) = channel_session();
        session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap();

        session.request_rerun(Tenor::ThreeMonths);

        assert_eq!(session.state(), PanelState::Open);
        assert_eq!(rx.try_recv().unwrap().tenor(), Some(Tenor::ThreeMonths));
    }

    #[test]
    fn test_close_discards_view() {
        let (session, mut rx) = channel_session();
        session
            .show(
                Tenor::OneMonth,
                snapshot(Tenor::OneMonth, dec!(4.50)),
                ReconciliationResult::empty(),
            )
            .unwrap();

        session.close();
        session.close();

        assert_eq!(session.state(), PanelState::Closed);
        assert!(session.current().is_none());
        assert_eq!(rx.try_recv().unwrap(), PanelSignal::Closed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_concurrent_readers_see_whole_views() {
        let session = Arc::new(TenorSession::with_logging());

        // 1M always pairs 4.365 with MATCHED, 3M pairs 4.415 with FAIL.
        let one_month = || {
            (
                snapshot(Tenor::OneMonth, dec!(4.50)),
                result(dec!(4.365), Some(dec!(4.365))),
            )
        };
        let three_months = || {
            (
                snapshot(Tenor::ThreeMonths, dec!(4.70)),
                result(dec!(4.415), Some(dec!(4.400))),
            )
        };

        std::thread::scope(|scope| {
            let writer = session.clone();
            scope.spawn(move || {
                for i in 0..2_000 {
                    let (tenor, (snap, res)) = if i % 2 == 0 {
                        (Tenor::OneMonth, one_month())
                    } else {
                        (Tenor::ThreeMonths, three_months())
                    };
                    writer.show(tenor, snap, res).unwrap();
                }
            });

            for _ in 0..4 {
                let reader = session.clone();
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        if let Some(view) = reader.current() {
                            match view.tenor {
                                Tenor::OneMonth => {
                                    assert_eq!(view.final_rate(), Some(dec!(4.365)));
                                    assert_eq!(view.status(), ReconStatus::Matched);
                                }
                                Tenor::ThreeMonths => {
                                    assert_eq!(view.final_rate(), Some(dec!(4.415)));
                                    assert_eq!(view.status(), ReconStatus::Fail);
                                }
                                other => panic!("unexpected tenor {}", other),
                            }
                            assert_eq!(view.snapshot.tenor(), view.tenor);
                        }
                    }
                });
            }
        });
    }
}
