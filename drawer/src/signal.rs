//! Outbound panel signals.

use chrono::{DateTime, Utc};
use nibor_common::Tenor;
use tokio::sync::mpsc;

/// Signals the panel sends to the calculation orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelSignal {
    /// Recompute the tenor and call `show()` again with fresh data.
    RerunRequested {
        tenor: Tenor,
        requested_at: DateTime<Utc>,
    },
    /// The panel was closed; any held view has been discarded.
    Closed,
}

impl PanelSignal {
    pub fn tenor(&self) -> Option<Tenor> {
        match self {
            PanelSignal::RerunRequested { tenor, .. } => Some(*tenor),
            PanelSignal::Closed => None,
        }
    }
}

/// Receiver of outbound signals. Delivery is fire-and-forget.
pub trait SignalSink: Send + Sync {
    fn emit(&self, signal: PanelSignal);
}

/// Sink that only logs signals.
pub struct LoggingSink;

impl SignalSink for LoggingSink {
    fn emit(&self, signal: PanelSignal) {
        match signal {
            PanelSignal::RerunRequested {
                tenor,
                requested_at,
            } => {
                tracing::info!(
                    tenor = %tenor,
                    requested_at = %requested_at,
                    "Re-run requested"
                );
            }
            PanelSignal::Closed => {
                tracing::info!("Panel closed");
            }
        }
    }
}

/// Sink that forwards signals over an unbounded tokio channel.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<PanelSignal>,
}

impl ChannelSink {
    /// Create a sink and the receiver the orchestrator listens on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PanelSignal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SignalSink for ChannelSink {
    fn emit(&self, signal: PanelSignal) {
        if let Err(e) = self.tx.send(signal) {
            tracing::warn!(signal = ?e.0, "Signal receiver dropped, signal discarded");
        }
    }
}
