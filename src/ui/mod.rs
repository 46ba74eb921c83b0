//! UI rendering using ratatui.

mod layout;
mod widgets;

pub use layout::Layout;
pub use widgets::{HelpPanel, MintPanel, StatusBar, StrategyList, TabBar};

use crate::config::{Config, KeyBindings};
use crate::state::{Store, View};
use ratatui::Frame;

/// Main UI renderer.
pub struct Ui {
    keybindings: KeyBindings,
    max_strategy_chars: usize,
    show_status_bar: bool,
}

impl Ui {
    /// Create a renderer for the given configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            keybindings: config.keybindings.clone(),
            max_strategy_chars: config.mint.max_strategy_chars,
            show_status_bar: config.ui.show_status_bar,
        }
    }

    /// Render the entire UI.
    pub fn render(&self, frame: &mut Frame, store: &Store) {
        let layout = Layout::new(frame.area());

        if self.show_status_bar {
            StatusBar::render(frame, layout.status_area, store);
        }
        TabBar::render(frame, layout.tab_area, store, &self.keybindings);

        match store.app.current_view {
            View::Mint => MintPanel::render(
                frame,
                layout.main_area,
                store,
                &self.keybindings,
                self.max_strategy_chars,
            ),
            View::Strategies => StrategyList::render(frame, layout.main_area, store),
        }

        if store.app.show_help {
            HelpPanel::render(frame, frame.area(), &self.keybindings);
        }

        if let Some(notification) = &store.app.notification {
            widgets::render_notification(frame, layout.notification_area, notification);
        }

        if let Some(error) = &store.app.error {
            widgets::render_error(frame, layout.notification_area, error);
        }
    }
}
