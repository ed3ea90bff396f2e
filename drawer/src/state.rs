//! Panel state definitions.

use serde::Serialize;

/// Visibility of the reconciliation panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PanelState {
    /// Nothing is shown.
    #[default]
    Closed,
    /// A tenor view is shown.
    Open,
    /// A re-run was requested; the last view stays visible until refreshed.
    AwaitingRerun,
}

impl PanelState {
    /// Check if a view is visible.
    pub fn is_visible(&self) -> bool {
        matches!(self, PanelState::Open | PanelState::AwaitingRerun)
    }

    /// Check if the shown data may be outdated.
    pub fn is_stale(&self) -> bool {
        matches!(self, PanelState::AwaitingRerun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility() {
        assert!(!PanelState::Closed.is_visible());
        assert!(PanelState::Open.is_visible());
        assert!(PanelState::AwaitingRerun.is_visible());
        assert!(PanelState::AwaitingRerun.is_stale());
        assert_eq!(PanelState::default(), PanelState::Closed);
    }
}
