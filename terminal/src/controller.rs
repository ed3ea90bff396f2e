//! Terminal controller: feeds the drawer and services its re-run requests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nibor_common::{optional_decimal, Currency, Tenor};
use nibor_drawer::{ChannelSink, Drawer, DrawerConfig, PanelSignal, TenorView};
use nibor_recon::{implied_yield, FacitValues, RateChange, RateSnapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

use crate::metrics::RunMetrics;
use crate::scenario::Scenario;

/// Upstream data for one tenor, validated.
#[derive(Debug, Clone)]
pub struct TenorInput {
    pub snapshot: RateSnapshot,
    pub facit: FacitValues,
    pub previous_rate: Option<Decimal>,
}

/// Supplier of tenor inputs, standing in for the calculation layer.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Tenors this source can supply, in display order.
    fn tenors(&self) -> Vec<Tenor>;

    /// Inputs for a tenor. `refresh` asks for recomputed market data.
    /// `None` means the source has nothing for the tenor.
    async fn fetch(&self, tenor: Tenor, refresh: bool) -> anyhow::Result<Option<TenorInput>>;
}

/// Source backed by a scenario, with seeded drift on refresh.
pub struct ScenarioSource {
    scenario: Scenario,
    config: DrawerConfig,
    /// Random number generator.
    rng: Arc<RwLock<StdRng>>,
    /// Largest drift applied to an implied rate on refresh, in basis points
    /// of a percent (0.0001).
    max_drift: u32,
}

impl ScenarioSource {
    pub fn new(scenario: Scenario, config: DrawerConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Self {
            scenario,
            config,
            rng: Arc::new(RwLock::new(rng)),
            max_drift: 5,
        }
    }

    pub fn with_max_drift(mut self, max_drift: u32) -> Self {
        self.max_drift = max_drift;
        self
    }

    async fn drift(&self, mut snapshot: RateSnapshot) -> RateSnapshot {
        let bound = i64::from(self.max_drift);
        let mut rng = self.rng.write().await;
        for currency in Currency::ALL {
            if let Some(rate) = snapshot.implied_rate(currency) {
                let drift = Decimal::new(rng.gen_range(-bound..=bound), 4);
                // Rates at the edge of the decimal range stay put.
                if let Some(drifted) = rate.checked_add(drift) {
                    snapshot = snapshot.with_implied_rate(currency, Some(drifted));
                }
            }
        }
        snapshot
    }
}

#[async_trait]
impl SnapshotSource for ScenarioSource {
    fn tenors(&self) -> Vec<Tenor> {
        self.scenario.tenors()
    }

    async fn fetch(&self, tenor: Tenor, refresh: bool) -> anyhow::Result<Option<TenorInput>> {
        let Some(case) = self.scenario.case(tenor) else {
            return Ok(None);
        };

        let mut snapshot = case
            .snapshot
            .clone()
            .into_snapshot(self.config.weight_sum_tolerance)?;
        if case.snapshot.spread.is_none() {
            snapshot = snapshot.with_spread(self.config.spread(tenor));
        }
        if refresh {
            snapshot = self.drift(snapshot).await;
        }

        Ok(Some(TenorInput {
            snapshot,
            facit: FacitValues::try_from(case.facit.clone())?,
            previous_rate: optional_decimal("previous_rate", case.previous_rate)?,
        }))
    }
}

/// Drives the drawer the way the application shell would.
pub struct TerminalController<S: SnapshotSource> {
    drawer: Drawer,
    source: S,
    signals: mpsc::UnboundedReceiver<PanelSignal>,
    metrics: Arc<RwLock<RunMetrics>>,
    funding_mode: bool,
}

impl<S: SnapshotSource> TerminalController<S> {
    pub fn new(config: DrawerConfig, source: S, funding_mode: bool) -> anyhow::Result<Self> {
        let (sink, signals) = ChannelSink::new();
        let drawer = Drawer::new(config, Arc::new(sink))?;

        Ok(Self {
            drawer,
            source,
            signals,
            metrics: Arc::new(RwLock::new(RunMetrics::new())),
            funding_mode,
        })
    }

    pub fn drawer(&self) -> &Drawer {
        &self.drawer
    }

    /// Fetch and show one tenor. `None` when the source has no data.
    pub async fn show_tenor(&self, tenor: Tenor) -> anyhow::Result<Option<Arc<TenorView>>> {
        match self.source.fetch(tenor, false).await? {
            Some(input) => Ok(Some(self.publish(input).await?)),
            None => {
                warn!(tenor = %tenor, "No data for tenor");
                Ok(None)
            }
        }
    }

    /// Show every tenor the source supplies, in order.
    pub async fn show_all(&self) -> anyhow::Result<usize> {
        let mut shown = 0;
        for tenor in self.source.tenors() {
            if self.show_tenor(tenor).await?.is_some() {
                shown += 1;
            }
        }
        Ok(shown)
    }

    pub fn request_rerun(&self, tenor: Tenor) {
        self.drawer.request_rerun(tenor);
    }

    pub fn close(&self) {
        self.drawer.close();
    }

    /// Handle every signal emitted so far. Returns how many were handled.
    pub async fn service_signals(&mut self) -> anyhow::Result<usize> {
        let mut handled = 0;

        while let Ok(signal) = self.signals.try_recv() {
            handled += 1;
            match signal {
                PanelSignal::RerunRequested {
                    tenor,
                    requested_at,
                } => {
                    self.metrics.write().await.record_rerun_requested();

                    match self.source.fetch(tenor, true).await {
                        Ok(Some(input)) => {
                            self.publish(input).await?;
                            self.metrics.write().await.record_rerun_completed();
                            let elapsed_ms = (Utc::now() - requested_at).num_milliseconds();
                            info!(tenor = %tenor, elapsed_ms, "Re-run completed");
                        }
                        Ok(None) => {
                            self.metrics.write().await.record_stale_rerun();
                            warn!(tenor = %tenor, "Re-run produced no data, keeping last view");
                        }
                        Err(e) => {
                            self.metrics.write().await.record_stale_rerun();
                            error!(tenor = %tenor, error = %e, "Re-run failed, keeping last view");
                        }
                    }
                }
                PanelSignal::Closed => {
                    info!("Panel closed by user");
                }
            }
        }

        Ok(handled)
    }

    /// Render the shown view.
    pub fn render(&self) -> Option<String> {
        self.drawer.render(self.funding_mode)
    }

    pub async fn metrics(&self) -> RunMetrics {
        self.metrics.read().await.clone()
    }

    async fn publish(&self, input: TenorInput) -> anyhow::Result<Arc<TenorView>> {
        let view = self.drawer.evaluate_and_show(input.snapshot, &input.facit)?;
        self.metrics.write().await.record_show(view.status());

        for currency in Currency::ALL {
            if let Some(inputs) = view.snapshot.fx_inputs(currency) {
                debug!(
                    tenor = %view.tenor,
                    currency = %currency,
                    implied_rate = ?view.snapshot.implied_rate(currency),
                    implied_yield = ?implied_yield(inputs),
                    "FX implied yield"
                );
            }
        }

        if let Some(final_rate) = view.final_rate() {
            if let Some(change) = RateChange::from_previous(final_rate, input.previous_rate) {
                info!(tenor = %view.tenor, change = %change, "Change against previous fixing");
            }
        }

        Ok(view)
    }
}
