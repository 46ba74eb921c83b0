//! The strategy mint workflow.
//!
//! A run takes raw strategy text through backend validation, wallet
//! submission, backend registration and confirmation polling, reporting
//! every stage change to the owning view through a [`SessionReporter`].

use super::{MintFailure, MintOutcome, MintStage, MintUpdate, SessionReporter};
use crate::api::{BackendClient, GENERIC_VALIDATION_ERROR, MintStatus, MintStatusReport};
use crate::auth::AuthProvider;
use crate::config::MintConfig;
use crate::wallet::{TransactionRequest, WalletAvailability, WalletProbe, WalletProvider, encode_mint};
use alloy_primitives::{Address, TxHash};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

pub const EMPTY_STRATEGY: &str = "Strategy cannot be empty";
pub const AUTH_REQUIRED: &str = "Authentication required. Please sign in and try again.";
pub const ALREADY_RUNNING: &str = "A mint is already in progress";
pub const NO_ACCOUNTS: &str = "No wallet accounts available";
pub const MINT_SUBMISSION_FAILED: &str = "Strategy validated but minting failed";
pub const REGISTRATION_FAILED: &str = "Failed to register minted strategy";
pub const CONFIRMATION_FAILED: &str = "Minting failed. Please try again.";
pub const CONFIRMATION_PENDING: &str =
    "Your strategy is still being confirmed on-chain. It will appear in your list once confirmed.";

/// Drives mint runs against injected auth, backend and wallet capabilities.
pub struct MintWorkflow {
    auth: Arc<dyn AuthProvider>,
    backend: Arc<dyn BackendClient>,
    wallet: Arc<dyn WalletProbe>,
    contract: Address,
    config: MintConfig,
    in_flight: AtomicBool,
}

impl MintWorkflow {
    /// Create a workflow minting against `contract`.
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        backend: Arc<dyn BackendClient>,
        wallet: Arc<dyn WalletProbe>,
        contract: Address,
        config: MintConfig,
    ) -> Self {
        Self {
            auth,
            backend,
            wallet,
            contract,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a run is currently in progress.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run a mint for `strategy`.
    ///
    /// A second run while one is in flight is rejected without touching the
    /// session. Input checks happen before any network activity.
    pub async fn run(&self, strategy: &str, reporter: &SessionReporter) -> MintOutcome {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("mint requested while another is in progress");
            return MintOutcome::failed(MintFailure::Precondition, ALREADY_RUNNING);
        };

        if let Err(message) = self.check_input(strategy) {
            return report_failure(reporter, MintOutcome::failed(MintFailure::Precondition, message));
        }

        let outcome = self.drive(strategy, reporter).await;
        match &outcome {
            MintOutcome::Success { strategy_id, token_id } => {
                info!(%strategy_id, %token_id, "mint confirmed")
            }
            MintOutcome::Cancelled => info!("mint session torn down"),
            other => debug!(outcome = ?other, "mint finished"),
        }
        outcome
    }

    fn check_input(&self, strategy: &str) -> Result<(), String> {
        if strategy.trim().is_empty() {
            return Err(EMPTY_STRATEGY.to_string());
        }
        let max = self.config.max_strategy_chars;
        if strategy.chars().count() > max {
            return Err(format!("Strategy must be {} characters or fewer", max));
        }
        Ok(())
    }

    async fn drive(&self, strategy: &str, reporter: &SessionReporter) -> MintOutcome {
        let token = match self.auth.token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                return report_failure(
                    reporter,
                    MintOutcome::failed(MintFailure::Precondition, AUTH_REQUIRED),
                );
            }
            Err(e) => {
                return report_failure(
                    reporter,
                    MintOutcome::failed(MintFailure::Unexpected, e.to_string()),
                );
            }
        };

        reporter.emit(MintUpdate::Started);
        info!(chars = strategy.chars().count(), "validating strategy");

        let validation = match self.backend.validate_strategy(&token, strategy).await {
            Ok(validation) => validation,
            Err(e) => {
                return report_failure(
                    reporter,
                    MintOutcome::failed(MintFailure::Unexpected, e.to_string()),
                );
            }
        };

        if !validation.valid {
            let errors = if validation.errors.is_empty() {
                vec![GENERIC_VALIDATION_ERROR.to_string()]
            } else {
                validation.errors
            };
            warn!(?errors, duplicate_id = ?validation.duplicate_id, "strategy rejected");
            reporter.emit(MintUpdate::Failed {
                errors: errors.clone(),
                duplicate_id: validation.duplicate_id.clone(),
                warning: validation.warning,
            });
            return MintOutcome::Failed {
                kind: MintFailure::ValidationRejected,
                errors,
                duplicate_id: validation.duplicate_id,
            };
        }

        reporter.emit(MintUpdate::Stage(MintStage::Minting));

        let wallet = match self.wallet.probe().await {
            WalletAvailability::Available(wallet) => wallet,
            WalletAvailability::Unavailable => {
                info!("no wallet available, skipping mint");
                reporter.emit(MintUpdate::Redirect);
                return MintOutcome::SoftSkipped;
            }
        };

        let payload = validation.compressed.as_deref().unwrap_or(strategy);
        let tx_hash = match self.submit(wallet.as_ref(), payload).await {
            Ok(hash) => hash,
            Err(outcome) => return report_failure(reporter, outcome),
        };

        reporter.emit(MintUpdate::Stage(MintStage::Finalizing));

        let registered = match self.backend.register_strategy(&token, tx_hash).await {
            Ok(registered) => registered,
            Err(e) => {
                return report_failure(
                    reporter,
                    MintOutcome::failed(
                        MintFailure::RegistrationFailed,
                        format!("{}: {}", REGISTRATION_FAILED, e),
                    ),
                );
            }
        };
        info!(strategy_id = %registered.id, %tx_hash, "strategy registered");

        self.await_confirmation(&token, &registered.id, reporter).await
    }

    async fn submit(
        &self,
        wallet: &dyn WalletProvider,
        payload: &str,
    ) -> Result<TxHash, MintOutcome> {
        let submission_failed = |e: crate::Error| {
            MintOutcome::failed(
                MintFailure::MintSubmissionFailed,
                format!("{}: {}", MINT_SUBMISSION_FAILED, e),
            )
        };

        let accounts = wallet.request_accounts().await.map_err(submission_failed)?;
        let Some(from) = accounts.first().copied() else {
            return Err(MintOutcome::failed(MintFailure::WalletNoAccounts, NO_ACCOUNTS));
        };

        let tx = TransactionRequest {
            from,
            to: self.contract,
            data: encode_mint(payload),
        };
        wallet.send_transaction(tx).await.map_err(submission_failed)
    }

    /// Poll the mint status until confirmed, failed, timed out or torn down.
    ///
    /// Liveness is checked before each poll is issued and again after its
    /// response arrives; nothing is reported once it is gone.
    async fn await_confirmation(
        &self,
        token: &str,
        strategy_id: &str,
        reporter: &SessionReporter,
    ) -> MintOutcome {
        let liveness = reporter.liveness();
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            tokio::select! {
                _ = liveness.cancelled() => return MintOutcome::Cancelled,
                _ = sleep(self.config.poll_interval()) => {}
            }

            if liveness.is_cancelled() {
                return MintOutcome::Cancelled;
            }
            polls += 1;
            let report = self.backend.mint_status(token, strategy_id).await;
            if liveness.is_cancelled() {
                debug!(polls, "dropping mint status after teardown");
                return MintOutcome::Cancelled;
            }

            match report {
                Ok(Some(MintStatusReport {
                    status: MintStatus::Confirmed,
                    token_id: Some(token_id),
                })) => {
                    reporter.emit(MintUpdate::Redirect);
                    return MintOutcome::Success {
                        strategy_id: strategy_id.to_string(),
                        token_id,
                    };
                }
                Ok(Some(MintStatusReport {
                    status: MintStatus::Failed,
                    ..
                })) => {
                    return report_failure(
                        reporter,
                        MintOutcome::failed(MintFailure::ConfirmationFailed, CONFIRMATION_FAILED),
                    );
                }
                Ok(_) => debug!(polls, strategy_id, "mint not confirmed yet"),
                Err(e) => warn!(polls, error = %e, "mint status poll failed"),
            }

            if started.elapsed() >= self.config.confirm_timeout() {
                warn!(polls, strategy_id, "mint confirmation timed out");
                let warning = CONFIRMATION_PENDING.to_string();
                reporter.emit(MintUpdate::Warning(warning.clone()));

                tokio::select! {
                    _ = liveness.cancelled() => return MintOutcome::Cancelled,
                    _ = sleep(self.config.redirect_delay()) => {}
                }
                reporter.emit(MintUpdate::Redirect);
                return MintOutcome::TimedOut {
                    strategy_id: strategy_id.to_string(),
                    warning,
                };
            }
        }
    }
}

/// Push a failed outcome's errors to the session and hand the outcome back.
fn report_failure(reporter: &SessionReporter, outcome: MintOutcome) -> MintOutcome {
    if let MintOutcome::Failed {
        kind,
        errors,
        duplicate_id,
    } = &outcome
    {
        error!(?kind, ?errors, "mint failed");
        reporter.emit(MintUpdate::Failed {
            errors: errors.clone(),
            duplicate_id: duplicate_id.clone(),
            warning: None,
        });
    }
    outcome
}

/// Marks a run as in flight until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockBackendClient, RegisteredStrategy, ValidationResult};
    use crate::auth::MockAuthProvider;
    use crate::mint::MintSession;
    use crate::state::Action;
    use crate::wallet::{MockWalletProbe, MockWalletProvider};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    const STRATEGY: &str = "buy 10% when rsi(14) < 30; sell when rsi(14) > 70";

    fn contract() -> Address {
        Address::repeat_byte(0xc0)
    }

    fn account() -> Address {
        Address::repeat_byte(0xa1)
    }

    fn tx_hash() -> TxHash {
        TxHash::repeat_byte(0x7e)
    }

    fn workflow(
        auth: MockAuthProvider,
        backend: MockBackendClient,
        probe: MockWalletProbe,
    ) -> MintWorkflow {
        MintWorkflow::new(
            Arc::new(auth),
            Arc::new(backend),
            Arc::new(probe),
            contract(),
            MintConfig::default(),
        )
    }

    fn reporter() -> (SessionReporter, mpsc::UnboundedReceiver<Action>, CancellationToken) {
        let (tx, rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        (SessionReporter::new(tx, token.clone()), rx, token)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Action>) -> Vec<MintUpdate> {
        let mut updates = Vec::new();
        while let Ok(action) = rx.try_recv() {
            if let Action::Mint(update) = action {
                updates.push(update);
            }
        }
        updates
    }

    fn replay(updates: &[MintUpdate]) -> MintSession {
        let mut session = MintSession::new();
        for update in updates {
            session.apply(update.clone());
        }
        session
    }

    fn signed_in() -> MockAuthProvider {
        let mut auth = MockAuthProvider::new();
        auth.expect_token()
            .returning(|| Ok(Some("token-123".to_string())));
        auth
    }

    fn accepting_backend(compressed: Option<&'static str>) -> MockBackendClient {
        let mut backend = MockBackendClient::new();
        backend
            .expect_validate_strategy()
            .withf(|token, strategy| token == "token-123" && strategy == STRATEGY)
            .times(1)
            .returning(move |_, _| Ok(ValidationResult::accepted(compressed.map(String::from))));
        backend
    }

    fn wallet_with_accounts(accounts: Vec<Address>) -> MockWalletProvider {
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_request_accounts()
            .times(1)
            .return_once(move || Ok(accounts));
        wallet
    }

    fn probe_with(wallet: MockWalletProvider) -> MockWalletProbe {
        let wallet: Arc<dyn WalletProvider> = Arc::new(wallet);
        let mut probe = MockWalletProbe::new();
        probe
            .expect_probe()
            .times(1)
            .return_once(move || WalletAvailability::Available(wallet));
        probe
    }

    fn sending_wallet() -> MockWalletProvider {
        let mut wallet = wallet_with_accounts(vec![account()]);
        wallet
            .expect_send_transaction()
            .times(1)
            .returning(|_| Ok(tx_hash()));
        wallet
    }

    fn expect_registration(backend: &mut MockBackendClient) {
        backend
            .expect_register_strategy()
            .withf(|token, hash| token == "token-123" && *hash == tx_hash())
            .times(1)
            .returning(|_, _| {
                Ok(RegisteredStrategy {
                    id: "strat-9".to_string(),
                })
            });
    }

    #[tokio::test]
    async fn test_empty_or_oversized_input_makes_no_calls() {
        let oversized = "x".repeat(5001);
        for input in ["", "   \n\t ", oversized.as_str()] {
            let wf = workflow(
                MockAuthProvider::new(),
                MockBackendClient::new(),
                MockWalletProbe::new(),
            );
            let (reporter, mut rx, _token) = reporter();

            let outcome = wf.run(input, &reporter).await;

            assert_eq!(outcome.failure(), Some(MintFailure::Precondition));
            let updates = drain(&mut rx);
            assert_eq!(updates.len(), 1);
            let session = replay(&updates);
            assert_eq!(session.stage, MintStage::Idle);
            assert_eq!(session.errors.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_input_at_limit_is_accepted() {
        let at_limit = "y".repeat(5000);
        let mut auth = MockAuthProvider::new();
        auth.expect_token().times(1).returning(|| Ok(None));
        let wf = workflow(auth, MockBackendClient::new(), MockWalletProbe::new());
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(&at_limit, &reporter).await;

        // Passes the length check and stops at the credential check.
        assert_eq!(
            outcome,
            MintOutcome::failed(MintFailure::Precondition, AUTH_REQUIRED)
        );
        assert_eq!(replay(&drain(&mut rx)).errors, vec![AUTH_REQUIRED]);
    }

    #[tokio::test]
    async fn test_auth_provider_error_is_reported_verbatim() {
        let mut auth = MockAuthProvider::new();
        auth.expect_token()
            .returning(|| Err(crate::Error::auth("session expired")));
        let wf = workflow(auth, MockBackendClient::new(), MockWalletProbe::new());
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome.failure(), Some(MintFailure::Unexpected));
        assert_eq!(
            replay(&drain(&mut rx)).errors,
            vec!["Authentication error: session expired"]
        );
    }

    #[tokio::test]
    async fn test_rejected_strategy_keeps_backend_errors() {
        let mut backend = MockBackendClient::new();
        backend.expect_validate_strategy().times(1).returning(|_, _| {
            Ok(ValidationResult {
                duplicate_id: Some("55".to_string()),
                ..ValidationResult::rejected(vec!["x".to_string(), "y".to_string()])
            })
        });
        let wf = workflow(signed_in(), backend, MockWalletProbe::new());
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome.failure(), Some(MintFailure::ValidationRejected));
        let session = replay(&drain(&mut rx));
        assert_eq!(session.errors, vec!["x", "y"]);
        assert_eq!(session.duplicate_id.as_deref(), Some("55"));
        assert_eq!(session.stage, MintStage::Idle);
        assert_eq!(session.redirects, 0);
    }

    #[tokio::test]
    async fn test_rejection_without_errors_gets_generic_message() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_validate_strategy()
            .returning(|_, _| Ok(ValidationResult::rejected(Vec::new())));
        let wf = workflow(signed_in(), backend, MockWalletProbe::new());
        let (reporter, mut rx, _token) = reporter();

        wf.run(STRATEGY, &reporter).await;

        assert_eq!(replay(&drain(&mut rx)).errors, vec![GENERIC_VALIDATION_ERROR]);
    }

    #[tokio::test]
    async fn test_validation_transport_error_is_unexpected() {
        let mut backend = MockBackendClient::new();
        backend
            .expect_validate_strategy()
            .returning(|_, _| Err(crate::Error::application("connection reset")));
        let wf = workflow(signed_in(), backend, MockWalletProbe::new());
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(
            outcome,
            MintOutcome::failed(MintFailure::Unexpected, "connection reset")
        );
        assert_eq!(replay(&drain(&mut rx)).errors, vec!["connection reset"]);
    }

    #[tokio::test]
    async fn test_no_wallet_soft_skips_to_list() {
        let mut probe = MockWalletProbe::new();
        probe
            .expect_probe()
            .times(1)
            .return_once(|| WalletAvailability::Unavailable);
        let wf = workflow(signed_in(), accepting_backend(None), probe);
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome, MintOutcome::SoftSkipped);
        let updates = drain(&mut rx);
        assert_eq!(
            updates,
            vec![
                MintUpdate::Started,
                MintUpdate::Stage(MintStage::Minting),
                MintUpdate::Redirect,
            ]
        );
        assert!(!replay(&updates).has_errors());
    }

    #[tokio::test]
    async fn test_no_accounts_fails_without_registration() {
        let wf = workflow(
            signed_in(),
            accepting_backend(None),
            probe_with(wallet_with_accounts(Vec::new())),
        );
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(
            outcome,
            MintOutcome::failed(MintFailure::WalletNoAccounts, NO_ACCOUNTS)
        );
        let session = replay(&drain(&mut rx));
        assert_eq!(session.errors, vec![NO_ACCOUNTS]);
        assert_eq!(session.stage, MintStage::Idle);
    }

    #[tokio::test]
    async fn test_wallet_rejection_is_combined_error() {
        let mut wallet = wallet_with_accounts(vec![account()]);
        wallet
            .expect_send_transaction()
            .times(1)
            .returning(|_| Err(crate::Error::wallet("user rejected the request (4001)")));
        let wf = workflow(signed_in(), accepting_backend(None), probe_with(wallet));
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome.failure(), Some(MintFailure::MintSubmissionFailed));
        let session = replay(&drain(&mut rx));
        assert_eq!(session.errors.len(), 1);
        assert!(session.errors[0].starts_with(MINT_SUBMISSION_FAILED));
        assert!(session.errors[0].contains("user rejected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_accounts_requested_once_before_submission() {
        let mut seq = Sequence::new();
        let mut wallet = MockWalletProvider::new();
        wallet
            .expect_request_accounts()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![account(), Address::repeat_byte(0xa2)]));
        wallet
            .expect_send_transaction()
            .withf(|tx| {
                tx.from == account() && tx.to == contract() && tx.data == encode_mint("c:rsi<30")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(tx_hash()));

        let mut backend = accepting_backend(Some("c:rsi<30"));
        expect_registration(&mut backend);
        backend
            .expect_mint_status()
            .times(1)
            .returning(|_, _| Ok(Some(MintStatusReport::confirmed("1"))));

        let wf = workflow(signed_in(), backend, probe_with(wallet));
        let (reporter, _rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;
        assert_eq!(
            outcome,
            MintOutcome::Success {
                strategy_id: "strat-9".to_string(),
                token_id: "1".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_registration_failure_stops_before_polling() {
        let mut backend = accepting_backend(None);
        backend
            .expect_register_strategy()
            .times(1)
            .returning(|_, _| Err(crate::Error::backend(500, "database unavailable")));
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome.failure(), Some(MintFailure::RegistrationFailed));
        let session = replay(&drain(&mut rx));
        assert!(session.errors[0].starts_with(REGISTRATION_FAILED));
        assert_eq!(session.redirects, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_on_third_poll_redirects() {
        let polled_at = Arc::new(Mutex::new(Vec::new()));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        {
            let polled_at = polled_at.clone();
            let calls = calls.clone();
            backend
                .expect_mint_status()
                .withf(|_, id| id == "strat-9")
                .returning(move |_, _| {
                    polled_at.lock().unwrap().push(Instant::now());
                    match calls.fetch_add(1, Ordering::SeqCst) + 1 {
                        1 => Ok(None),
                        2 => Ok(Some(MintStatusReport::pending())),
                        _ => Ok(Some(MintStatusReport::confirmed("42"))),
                    }
                });
        }

        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(
            outcome,
            MintOutcome::Success {
                strategy_id: "strat-9".to_string(),
                token_id: "42".to_string(),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let polled_at = polled_at.lock().unwrap();
        for pair in polled_at.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }

        let updates = drain(&mut rx);
        assert_eq!(
            updates,
            vec![
                MintUpdate::Started,
                MintUpdate::Stage(MintStage::Minting),
                MintUpdate::Stage(MintStage::Finalizing),
                MintUpdate::Redirect,
            ]
        );
        let session = replay(&updates);
        assert!(!session.has_errors());
        assert_eq!(session.redirects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmed_without_token_keeps_polling() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        {
            let calls = calls.clone();
            backend.expect_mint_status().returning(move |_, _| {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Some(MintStatusReport {
                        status: MintStatus::Confirmed,
                        token_id: None,
                    }))
                } else {
                    Ok(Some(MintStatusReport::confirmed("8")))
                }
            });
        }
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));
        let (reporter, _rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert!(matches!(outcome, MintOutcome::Success { ref token_id, .. } if token_id == "8"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_mint_status_is_an_error() {
        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        backend
            .expect_mint_status()
            .times(1)
            .returning(|_, _| Ok(Some(MintStatusReport::failed())));
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));
        let (reporter, mut rx, _token) = reporter();

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(
            outcome,
            MintOutcome::failed(MintFailure::ConfirmationFailed, CONFIRMATION_FAILED)
        );
        let session = replay(&drain(&mut rx));
        assert_eq!(session.errors, vec![CONFIRMATION_FAILED]);
        assert_eq!(session.redirects, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_mint_times_out_with_warning() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        {
            let calls = calls.clone();
            backend.expect_mint_status().returning(move |_, _| {
                match calls.fetch_add(1, Ordering::SeqCst) % 3 {
                    0 => Ok(None),
                    1 => Err(crate::Error::application("timeout")),
                    _ => Ok(Some(MintStatusReport::pending())),
                }
            });
        }
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));
        let (reporter, mut rx, _token) = reporter();

        let started = Instant::now();
        let outcome = wf.run(STRATEGY, &reporter).await;
        let elapsed = started.elapsed();

        assert_eq!(
            outcome,
            MintOutcome::TimedOut {
                strategy_id: "strat-9".to_string(),
                warning: CONFIRMATION_PENDING.to_string(),
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 60);
        assert!(elapsed >= Duration::from_secs(62));
        assert!(elapsed < Duration::from_secs(63));

        let updates = drain(&mut rx);
        assert_eq!(
            &updates[updates.len() - 2..],
            &[
                MintUpdate::Warning(CONFIRMATION_PENDING.to_string()),
                MintUpdate::Redirect,
            ]
        );
        assert!(!updates.iter().any(|u| matches!(u, MintUpdate::Failed { .. })));
        let session = replay(&updates);
        assert!(!session.has_errors());
        assert_eq!(session.warning.as_deref(), Some(CONFIRMATION_PENDING));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_during_poll_suppresses_response() {
        let (reporter, mut rx, token) = reporter();

        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        {
            let token = token.clone();
            backend
                .expect_mint_status()
                .times(1)
                .returning(move |_, _| {
                    // The view unmounts while the request is in flight.
                    token.cancel();
                    Ok(Some(MintStatusReport::confirmed("42")))
                });
        }
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));

        let outcome = wf.run(STRATEGY, &reporter).await;

        assert_eq!(outcome, MintOutcome::Cancelled);
        let updates = drain(&mut rx);
        assert_eq!(updates.last(), Some(&MintUpdate::Stage(MintStage::Finalizing)));
        assert_eq!(replay(&updates).redirects, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_between_polls_stops_polling() {
        let (reporter, mut rx, token) = reporter();

        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        backend
            .expect_mint_status()
            .times(2)
            .returning(|_, _| Ok(Some(MintStatusReport::pending())));
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));

        let (outcome, _) = tokio::join!(wf.run(STRATEGY, &reporter), async {
            sleep(Duration::from_millis(2500)).await;
            token.cancel();
        });

        assert_eq!(outcome, MintOutcome::Cancelled);
        let updates = drain(&mut rx);
        assert!(!updates.iter().any(|u| matches!(
            u,
            MintUpdate::Redirect | MintUpdate::Warning(_) | MintUpdate::Failed { .. }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_during_redirect_delay_suppresses_redirect() {
        let (reporter, mut rx, token) = reporter();

        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        backend
            .expect_mint_status()
            .returning(|_, _| Ok(Some(MintStatusReport::pending())));
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));

        let (outcome, _) = tokio::join!(wf.run(STRATEGY, &reporter), async {
            sleep(Duration::from_millis(61_000)).await;
            token.cancel();
        });

        assert_eq!(outcome, MintOutcome::Cancelled);
        let updates = drain(&mut rx);
        assert_eq!(
            updates.last(),
            Some(&MintUpdate::Warning(CONFIRMATION_PENDING.to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_while_in_flight_is_rejected() {
        let (reporter, _rx, token) = reporter();
        let (other_reporter, mut other_rx, _other_token) = self::reporter();

        let mut backend = accepting_backend(None);
        expect_registration(&mut backend);
        backend
            .expect_mint_status()
            .returning(|_, _| Ok(Some(MintStatusReport::pending())));
        let wf = workflow(signed_in(), backend, probe_with(sending_wallet()));

        let (first, second) = tokio::join!(wf.run(STRATEGY, &reporter), async {
            sleep(Duration::from_millis(1500)).await;
            assert!(wf.is_running());
            let outcome = wf.run(STRATEGY, &other_reporter).await;
            token.cancel();
            outcome
        });

        assert_eq!(first, MintOutcome::Cancelled);
        assert_eq!(
            second,
            MintOutcome::failed(MintFailure::Precondition, ALREADY_RUNNING)
        );
        assert!(drain(&mut other_rx).is_empty());
        assert!(!wf.is_running());
    }
}
