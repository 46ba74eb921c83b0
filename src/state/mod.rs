//! State management for Gammabots.
//!
//! All mutations flow through [`Action`]s reduced by the [`Store`], including
//! progress reported by background mint runs.

mod app_state;
mod strategy_state;

pub use app_state::{AppState, InputMode, View};
pub use strategy_state::StrategyState;

use crate::api::StrategySummary;
use crate::error::Result;
use crate::mint::{MintSession, MintUpdate};
use tokio::sync::mpsc;
use tracing::debug;

/// Actions that can be dispatched to modify state.
#[derive(Debug, Clone)]
pub enum Action {
    // Navigation
    SetView(View),
    SetInputMode(InputMode),

    // Strategy editor
    InsertChar(char),
    DeleteChar,
    CursorLeft,
    CursorRight,
    ClearInput,
    Paste(String),

    // Minting
    SubmitMint,
    Mint(MintUpdate),

    // Strategy list
    LoadStrategies,
    StrategiesLoaded(Vec<StrategySummary>),

    // UI actions
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    ToggleHelp,
    ShowNotification(Notification),
    DismissNotification,

    // Error handling
    SetError(String),
    ClearError,

    // Quit
    Quit,
}

/// A notification to display to the user.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub duration_secs: u64,
}

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Info, 3)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Success, 3)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Warning, 5)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(message, NotificationLevel::Error, 10)
    }

    fn with_level(message: impl Into<String>, level: NotificationLevel, duration_secs: u64) -> Self {
        Self {
            message: message.into(),
            level,
            duration_secs,
        }
    }
}

/// The global state store.
#[derive(Debug)]
pub struct Store {
    /// Application state.
    pub app: AppState,
    /// The mint session shown in the mint view.
    pub mint: MintSession,
    /// The user's strategies.
    pub strategies: StrategyState,
    /// Action sender for dispatching actions.
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Store {
    /// Create a new store with the given action sender.
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            app: AppState::default(),
            mint: MintSession::new(),
            strategies: StrategyState::default(),
            action_tx,
        }
    }

    /// Dispatch an action to the store.
    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.action_tx
            .send(action)
            .map_err(|e| crate::Error::channel(e.to_string()))
    }

    /// A sender that background tasks can dispatch through.
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.action_tx.clone()
    }

    /// Apply an action to update state.
    pub fn reduce(&mut self, action: Action) {
        match action {
            // Navigation
            Action::SetView(view) => {
                if self.app.current_view == View::Mint && view != View::Mint {
                    self.mint.discard();
                }
                self.app.current_view = view;
                if view != View::Mint {
                    self.app.input_mode = InputMode::Normal;
                }
            }
            Action::SetInputMode(mode) => self.app.input_mode = mode,

            // Strategy editor
            Action::InsertChar(c) => self.app.push_char(c),
            Action::DeleteChar => self.app.pop_char(),
            Action::CursorLeft => self.app.cursor_left(),
            Action::CursorRight => self.app.cursor_right(),
            Action::ClearInput => self.app.clear_input(),
            Action::Paste(text) => self.app.push_str(&text),

            // Minting
            Action::SubmitMint => self.app.input_mode = InputMode::Normal,
            // Updates queued before an unmount must not revive the session.
            Action::Mint(update) if self.app.current_view == View::Mint => {
                self.mint.apply(update);
            }
            Action::Mint(update) => {
                debug!(?update, "dropping update for unmounted mint view");
            }

            // Strategy list
            Action::LoadStrategies => self.strategies.loading = true,
            Action::StrategiesLoaded(strategies) => self.strategies.set_strategies(strategies),

            // UI actions
            Action::ScrollUp => self.scroll(-1),
            Action::ScrollDown => self.scroll(1),
            Action::PageUp => self.scroll(-10),
            Action::PageDown => self.scroll(10),
            Action::GoToTop => self.go_to_top(),
            Action::GoToBottom => self.go_to_bottom(),
            Action::ToggleHelp => self.app.show_help = !self.app.show_help,
            Action::ShowNotification(notification) => {
                self.app.notification = Some(notification);
            }
            Action::DismissNotification => {
                self.app.notification = None;
            }

            // Error handling
            Action::SetError(error) => {
                self.app.error = Some(error);
                self.strategies.loading = false;
            }
            Action::ClearError => {
                self.app.error = None;
            }

            // Quit
            Action::Quit => {
                self.mint.discard();
                self.app.should_quit = true;
            }
        }
    }

    fn scroll(&mut self, delta: i32) {
        if self.app.current_view != View::Strategies || self.strategies.strategies.is_empty() {
            return;
        }
        let current = self.strategies.selected_index.unwrap_or(0) as i32;
        let new_index = (current + delta).max(0) as usize;
        let max_index = self.strategies.strategies.len() - 1;
        self.strategies.selected_index = Some(new_index.min(max_index));
    }

    fn go_to_top(&mut self) {
        if self.app.current_view == View::Strategies && !self.strategies.strategies.is_empty() {
            self.strategies.selected_index = Some(0);
        }
    }

    fn go_to_bottom(&mut self) {
        if self.app.current_view == View::Strategies && !self.strategies.strategies.is_empty() {
            self.strategies.selected_index = Some(self.strategies.strategies.len() - 1);
        }
    }
}
