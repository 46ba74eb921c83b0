//! Strategy list state.

use crate::api::{MintStatus, StrategySummary};
use chrono::{DateTime, Utc};

/// The user's strategies as shown in the list view.
#[derive(Debug, Default)]
pub struct StrategyState {
    /// Strategies, newest first.
    pub strategies: Vec<StrategySummary>,
    /// Currently selected index.
    pub selected_index: Option<usize>,
    /// Whether strategies are being loaded.
    pub loading: bool,
    /// Last update timestamp.
    pub last_updated: Option<DateTime<Utc>>,
}

impl StrategyState {
    /// Replace the list, keeping the selection in range.
    pub fn set_strategies(&mut self, mut strategies: Vec<StrategySummary>) {
        strategies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.strategies = strategies;
        self.loading = false;
        self.last_updated = Some(Utc::now());
        self.selected_index = match self.selected_index {
            _ if self.strategies.is_empty() => None,
            Some(i) => Some(i.min(self.strategies.len() - 1)),
            None => Some(0),
        };
    }

    /// Get the selected strategy.
    pub fn selected(&self) -> Option<&StrategySummary> {
        self.selected_index.and_then(|i| self.strategies.get(i))
    }

    /// Number of strategies with a confirmed mint.
    pub fn minted_count(&self) -> usize {
        self.strategies
            .iter()
            .filter(|s| s.mint_status == MintStatus::Confirmed)
            .count()
    }

    /// Number of strategies still waiting for confirmation.
    pub fn pending_count(&self) -> usize {
        self.strategies
            .iter()
            .filter(|s| s.mint_status == MintStatus::Pending)
            .count()
    }
}
