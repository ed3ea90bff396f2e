//! NIBOR Reconciliation Drawer
//!
//! Holds the tenor the panel currently shows and mediates the two
//! outbound signals, re-run and close. Every `show()` publishes a fully
//! built view with a single swap, so a concurrent reader sees either the
//! old or the new view, never a mix.

pub mod board;
pub mod config;
pub mod drawer;
pub mod report;
pub mod session;
pub mod signal;
pub mod state;

pub use board::FixingBoard;
pub use config::DrawerConfig;
pub use drawer::Drawer;
pub use report::DrawerReport;
pub use session::{TenorSession, TenorView};
pub use signal::{ChannelSink, LoggingSink, PanelSignal, SignalSink};
pub use state::PanelState;
