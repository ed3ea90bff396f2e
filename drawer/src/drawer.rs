//! Panel controller tying the engine, session and board together.

use std::sync::Arc;

use nibor_common::{NiborError, Result, Tenor};
use nibor_recon::{FacitValues, RateSnapshot, ReconEngine, ReconciliationResult};
use tracing::{info, instrument};

use crate::board::FixingBoard;
use crate::config::DrawerConfig;
use crate::report::DrawerReport;
use crate::session::{TenorSession, TenorView};
use crate::signal::SignalSink;

/// The reconciliation panel.
pub struct Drawer {
    config: DrawerConfig,
    engine: ReconEngine,
    session: Arc<TenorSession>,
    board: Arc<FixingBoard>,
}

impl Drawer {
    /// Create a drawer. Fails if the configuration is invalid.
    pub fn new(config: DrawerConfig, sink: Arc<dyn SignalSink>) -> Result<Self> {
        config.validate().map_err(NiborError::Configuration)?;

        Ok(Self {
            engine: ReconEngine::new(config.engine_config()),
            session: Arc::new(TenorSession::new(sink)),
            board: Arc::new(FixingBoard::new(config.confirm_tenors.clone())),
            config,
        })
    }

    pub fn session(&self) -> Arc<TenorSession> {
        self.session.clone()
    }

    pub fn board(&self) -> Arc<FixingBoard> {
        self.board.clone()
    }

    /// Show an externally reconciled snapshot and record its status.
    pub fn show(
        &self,
        tenor: Tenor,
        snapshot: RateSnapshot,
        result: ReconciliationResult,
    ) -> Result<Arc<TenorView>> {
        let view = self.session.show(tenor, snapshot, result)?;
        self.board.record(view.tenor, view.status());
        Ok(view)
    }

    /// Reconcile a snapshot against the facit and show it.
    #[instrument(skip(self, snapshot, facit), fields(tenor = %snapshot.tenor()))]
    pub fn evaluate_and_show(
        &self,
        snapshot: RateSnapshot,
        facit: &FacitValues,
    ) -> Result<Arc<TenorView>> {
        let tenor = snapshot.tenor();
        let evaluation = self.engine.evaluate(snapshot, facit)?;
        let (snapshot, result) = evaluation.into_parts();
        self.show(tenor, snapshot, result)
    }

    pub fn request_rerun(&self, tenor: Tenor) {
        self.session.request_rerun(tenor);
    }

    /// Close the panel. Board statuses are session data and go with it.
    pub fn close(&self) {
        self.session.close();
        self.board.clear();
    }

    /// Confirm gate over the configured tenors.
    pub fn ready_to_confirm(&self) -> bool {
        let ready = self.board.ready_to_confirm();
        if !ready {
            info!(outstanding = ?self.board.outstanding(), "Fixing not ready to confirm");
        }
        ready
    }

    /// Render the shown view, if any.
    pub fn render(&self, funding_mode: bool) -> Option<String> {
        let (state, view) = self.session.observe();
        let view = view?;
        let report = DrawerReport::new(&view)
            .funding_mode(funding_mode)
            .decimals(self.config.display_decimals)
            .stale(state.is_stale());
        Some(report.to_string())
    }
}
