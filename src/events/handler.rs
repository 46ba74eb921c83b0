//! Event handler for processing input events.

use super::InputEvent;
use crate::config::KeyBindings;
use crate::error::Result;
use crate::state::{Action, InputMode, Store, View};
use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

/// Handles input events and produces actions.
pub struct EventHandler {
    /// Key bindings.
    keybindings: KeyBindings,
    /// How long to wait for input before yielding.
    poll_timeout: Duration,
    /// Store reference for state-aware handling.
    store_snapshot: Option<StoreSnapshot>,
}

/// Snapshot of relevant store state for event handling.
#[derive(Debug, Clone, Copy)]
struct StoreSnapshot {
    input_mode: InputMode,
    current_view: View,
    show_help: bool,
    has_notification: bool,
    has_error: bool,
}

impl EventHandler {
    /// Create a new event handler with the given bindings.
    pub fn new(keybindings: KeyBindings, poll_timeout: Duration) -> Self {
        Self {
            keybindings,
            poll_timeout,
            store_snapshot: None,
        }
    }

    /// Update the store snapshot for state-aware event handling.
    pub fn update_store_snapshot(&mut self, store: &Store) {
        self.store_snapshot = Some(StoreSnapshot {
            input_mode: store.app.input_mode,
            current_view: store.app.current_view,
            show_help: store.app.show_help,
            has_notification: store.app.notification.is_some(),
            has_error: store.app.error.is_some(),
        });
    }

    /// Get the next action from user input.
    pub async fn next(&mut self) -> Result<Option<Action>> {
        if event::poll(self.poll_timeout)? {
            let action = match event::read()? {
                CrosstermEvent::Key(key) => self.handle_key(key),
                CrosstermEvent::Mouse(mouse) => self.handle_mouse(mouse),
                CrosstermEvent::Paste(text) => self.handle_paste(text),
                _ => None,
            };
            return Ok(action);
        }
        Ok(None)
    }

    /// Handle a key event and return an optional action.
    fn handle_key(&self, key: KeyEvent) -> Option<Action> {
        // Only process key press events
        if key.kind != KeyEventKind::Press {
            return None;
        }

        let snapshot = self.store_snapshot?;

        match snapshot.input_mode {
            InputMode::Normal => self.handle_normal_mode(key, snapshot),
            InputMode::Insert => self.handle_insert_mode(key),
        }
    }

    /// Handle a mouse event and return an optional action.
    fn handle_mouse(&self, mouse: MouseEvent) -> Option<Action> {
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Action::ScrollUp),
            MouseEventKind::ScrollDown => Some(Action::ScrollDown),
            _ => None,
        }
    }

    /// Pasted text goes into the strategy editor.
    fn handle_paste(&self, text: String) -> Option<Action> {
        let snapshot = self.store_snapshot?;
        (snapshot.current_view == View::Mint).then(|| Action::Paste(normalize_newlines(&text)))
    }

    fn handle_normal_mode(&self, key: KeyEvent, snapshot: StoreSnapshot) -> Option<Action> {
        let input = InputEvent::from(key);

        if input.matches(&self.keybindings.back) {
            if snapshot.show_help {
                return Some(Action::ToggleHelp);
            }
            if snapshot.has_error {
                return Some(Action::ClearError);
            }
            if snapshot.has_notification {
                return Some(Action::DismissNotification);
            }
            if snapshot.current_view == View::Strategies {
                return Some(Action::SetView(View::Mint));
            }
            return None;
        }

        // Global shortcuts
        if input.matches(&self.keybindings.quit) {
            return Some(Action::Quit);
        }
        if input.matches(&self.keybindings.help) {
            return Some(Action::ToggleHelp);
        }
        if input.matches(&self.keybindings.refresh) {
            return Some(Action::LoadStrategies);
        }

        // View switching
        if input.matches(&self.keybindings.mint) {
            return Some(Action::SetView(View::Mint));
        }
        if input.matches(&self.keybindings.strategies) {
            return Some(Action::SetView(View::Strategies));
        }

        match snapshot.current_view {
            View::Mint => self.handle_mint_view(input),
            View::Strategies => self.handle_strategies_view(input, key),
        }
    }

    fn handle_mint_view(&self, input: InputEvent) -> Option<Action> {
        if input.matches(&self.keybindings.edit) || input.matches("Enter") {
            return Some(Action::SetInputMode(InputMode::Insert));
        }
        if input.matches(&self.keybindings.submit) {
            return Some(Action::SubmitMint);
        }
        if input.matches(&self.keybindings.clear) {
            return Some(Action::ClearInput);
        }
        None
    }

    fn handle_strategies_view(&self, input: InputEvent, key: KeyEvent) -> Option<Action> {
        if input.matches(&self.keybindings.up) || key.code == KeyCode::Up {
            return Some(Action::ScrollUp);
        }
        if input.matches(&self.keybindings.down) || key.code == KeyCode::Down {
            return Some(Action::ScrollDown);
        }

        match key.code {
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::Home => Some(Action::GoToTop),
            KeyCode::End => Some(Action::GoToBottom),
            _ => None,
        }
    }

    fn handle_insert_mode(&self, key: KeyEvent) -> Option<Action> {
        let input = InputEvent::from(key);

        if input.matches(&self.keybindings.submit) {
            return Some(Action::SubmitMint);
        }
        if input.matches(&self.keybindings.clear) {
            return Some(Action::ClearInput);
        }

        match key.code {
            KeyCode::Esc => Some(Action::SetInputMode(InputMode::Normal)),
            KeyCode::Enter => Some(Action::InsertChar('\n')),
            KeyCode::Tab => Some(Action::InsertChar('\t')),
            KeyCode::Backspace => Some(Action::DeleteChar),
            KeyCode::Left => Some(Action::CursorLeft),
            KeyCode::Right => Some(Action::CursorRight),
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(Action::InsertChar(c))
            }
            _ => None,
        }
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
