//! Main application module.
//!
//! This module contains the main `App` struct that coordinates
//! the event loop, state management, background mint runs, and rendering.

use crate::api::{BackendClient, HttpBackend};
use crate::auth::{AuthProvider, StaticTokenAuth};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventHandler;
use crate::mint::{MintOutcome, MintUpdate, MintWorkflow, SessionReporter};
use crate::state::{Action, Notification, Store, View};
use crate::ui::Ui;
use crate::wallet::{ConfiguredWalletProbe, WalletProbe, contract_address};

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The main application.
pub struct App {
    /// Terminal.
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application store.
    store: Store,
    /// Event handler.
    event_handler: EventHandler,
    /// Action receiver.
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Renderer.
    ui: Ui,
    /// Credential source.
    auth: Arc<dyn AuthProvider>,
    /// Backend client.
    backend: Arc<dyn BackendClient>,
    /// Wallet probe, used for the status bar.
    wallet: Arc<dyn WalletProbe>,
    /// The mint workflow shared with background runs.
    workflow: Arc<MintWorkflow>,
    /// Liveness of the mounted mint view.
    mint_view: MintView,
    /// When the current notification was shown.
    notification_shown: Option<Instant>,
    /// Configuration.
    config: Config,
}

impl App {
    /// Create a new application.
    pub async fn new(config: Config) -> Result<Self> {
        // Build services before touching the terminal so that a bad config
        // fails on a normal screen.
        let auth: Arc<dyn AuthProvider> = Arc::new(StaticTokenAuth::from_config(&config.auth));
        let backend: Arc<dyn BackendClient> = Arc::new(HttpBackend::new(config.api.clone())?);
        let wallet: Arc<dyn WalletProbe> =
            Arc::new(ConfiguredWalletProbe::from_config(&config.wallet)?);
        let workflow = Arc::new(MintWorkflow::new(
            auth.clone(),
            backend.clone(),
            wallet.clone(),
            contract_address(&config.wallet)?,
            config.mint.clone(),
        ));

        // Set up terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
        if config.ui.mouse_support {
            execute!(stdout, EnableMouseCapture)?;
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Create action channel
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let store = Store::new(action_tx);
        let event_handler = EventHandler::new(
            config.keybindings.clone(),
            Duration::from_millis(config.ui.tick_rate_ms),
        );
        let ui = Ui::new(&config);

        Ok(Self {
            terminal,
            store,
            event_handler,
            action_rx,
            ui,
            auth,
            backend,
            wallet,
            workflow,
            mint_view: MintView::default(),
            notification_shown: None,
            config,
        })
    }

    /// Run the application event loop.
    pub async fn run(&mut self) -> Result<()> {
        self.store.app.signed_in = matches!(self.auth.token().await, Ok(Some(_)));
        self.store.app.wallet_available = self.wallet.probe().await.is_available();
        info!(
            signed_in = self.store.app.signed_in,
            wallet = self.store.app.wallet_available,
            "gammabots started"
        );

        if self.store.app.signed_in {
            self.store.dispatch(Action::LoadStrategies)?;
        }

        // Main event loop
        loop {
            self.expire_notification();

            // Update event handler with current state
            self.event_handler.update_store_snapshot(&self.store);

            // Render UI
            let (ui, store) = (&self.ui, &self.store);
            self.terminal.draw(|frame| ui.render(frame, store))?;

            // Handle events and actions
            tokio::select! {
                // Handle terminal events
                result = self.event_handler.next() => {
                    if let Some(action) = result? {
                        self.handle_action(action)?;
                    }
                }

                // Handle actions from the channel
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action)?;
                }
            }

            // Check if we should quit
            if self.store.app.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle an action.
    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::SubmitMint => {
                self.store.reduce(Action::SubmitMint);
                self.submit_mint();
            }
            Action::SetView(view) => self.navigate(view),
            Action::Mint(MintUpdate::Redirect) => {
                self.store.reduce(Action::Mint(MintUpdate::Redirect));
                self.navigate(View::Strategies);
            }
            Action::LoadStrategies => {
                self.store.reduce(Action::LoadStrategies);
                self.load_strategies();
            }
            Action::ShowNotification(notification) => {
                self.notification_shown = Some(Instant::now());
                self.store.reduce(Action::ShowNotification(notification));
            }
            Action::Quit => self.mint_view.quit(&mut self.store),
            action => self.store.reduce(action),
        }

        Ok(())
    }

    /// Switch views. Leaving the mint view tears down its session.
    fn navigate(&mut self, view: View) {
        if self.mint_view.navigate(&mut self.store, view) {
            self.load_strategies();
        }
    }

    /// Start a mint run in the background.
    fn submit_mint(&mut self) {
        if self.workflow.is_running() {
            self.show(Notification::warning(crate::mint::ALREADY_RUNNING));
            return;
        }

        let reporter = SessionReporter::new(self.store.sender(), self.mint_view.token());
        let workflow = self.workflow.clone();
        let action_tx = self.store.sender();
        let strategy = self.store.app.input_buffer.clone();

        tokio::spawn(async move {
            let outcome = workflow.run(&strategy, &reporter).await;
            if let Some(notification) = outcome_notification(&outcome) {
                let _ = action_tx.send(Action::ShowNotification(notification));
            }
        });
    }

    /// Fetch the strategy list in the background.
    fn load_strategies(&self) {
        let auth = self.auth.clone();
        let backend = self.backend.clone();
        let action_tx = self.store.sender();

        tokio::spawn(async move {
            let action = match fetch_strategies(auth.as_ref(), backend.as_ref()).await {
                Ok(strategies) => Action::StrategiesLoaded(strategies),
                Err(e) => {
                    warn!(error = %e, "failed to load strategies");
                    Action::SetError(e.to_string())
                }
            };
            let _ = action_tx.send(action);
        });
    }

    fn show(&mut self, notification: Notification) {
        self.notification_shown = Some(Instant::now());
        self.store.reduce(Action::ShowNotification(notification));
    }

    fn expire_notification(&mut self) {
        let Some(notification) = &self.store.app.notification else {
            self.notification_shown = None;
            return;
        };
        let shown = *self.notification_shown.get_or_insert_with(Instant::now);
        if shown.elapsed() >= Duration::from_secs(notification.duration_secs) {
            self.store.reduce(Action::DismissNotification);
            self.notification_shown = None;
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Mount state of the mint view.
///
/// Runs started from the view report through its token, so cancelling it
/// silences them. Every mount gets a fresh token.
#[derive(Debug, Default)]
struct MintView {
    liveness: CancellationToken,
}

impl MintView {
    fn token(&self) -> CancellationToken {
        self.liveness.clone()
    }

    /// Apply a view change. Returns true when the strategy list should be fetched.
    fn navigate(&mut self, store: &mut Store, view: View) -> bool {
        let current = store.app.current_view;
        if current == View::Mint && view != View::Mint {
            debug!("mint view unmounted");
            self.liveness.cancel();
        }
        if current != View::Mint && view == View::Mint {
            self.liveness = CancellationToken::new();
        }

        store.reduce(Action::SetView(view));

        let load = view == View::Strategies && current != View::Strategies;
        if load {
            store.reduce(Action::LoadStrategies);
        }
        load
    }

    fn quit(&mut self, store: &mut Store) {
        self.liveness.cancel();
        store.reduce(Action::Quit);
    }
}

async fn fetch_strategies(
    auth: &dyn AuthProvider,
    backend: &dyn BackendClient,
) -> Result<Vec<crate::api::StrategySummary>> {
    let token = auth
        .token()
        .await?
        .ok_or_else(|| Error::auth("Sign in to see your strategies"))?;
    backend.list_strategies(&token).await
}

/// The notification that summarizes a finished run, if any.
///
/// Failures are already shown in the session panel.
fn outcome_notification(outcome: &MintOutcome) -> Option<Notification> {
    match outcome {
        MintOutcome::Success {
            strategy_id,
            token_id,
        } => Some(Notification::success(format!(
            "Strategy #{strategy_id} minted as token #{token_id}"
        ))),
        MintOutcome::SoftSkipped => Some(Notification::info(
            "Strategy validated. Connect a wallet to mint it.",
        )),
        MintOutcome::TimedOut { warning, .. } => Some(Notification::warning(warning.clone())),
        MintOutcome::Failed { .. } | MintOutcome::Cancelled => None,
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.mint_view.liveness.cancel();

        // Restore terminal state
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}
