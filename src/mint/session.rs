//! Observable state of a mint session.

use crate::state::Action;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Where a mint session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MintStage {
    #[default]
    Idle,
    Validating,
    Minting,
    Finalizing,
}

impl MintStage {
    /// Whether a mint is in progress.
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for MintStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Validating => write!(f, "Validating strategy"),
            Self::Minting => write!(f, "Minting"),
            Self::Finalizing => write!(f, "Waiting for confirmation"),
        }
    }
}

/// A single mutation of the mint session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintUpdate {
    /// A new run passed its preconditions: clear the previous run's messages.
    Started,
    /// Move to a stage.
    Stage(MintStage),
    /// The run failed; back to idle with these messages.
    Failed {
        errors: Vec<String>,
        duplicate_id: Option<String>,
        warning: Option<String>,
    },
    /// Soft failure: show a warning, a redirect follows.
    Warning(String),
    /// The run is over and the user should be sent to the strategy list.
    Redirect,
}

/// State shown to the user while minting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintSession {
    pub stage: MintStage,
    pub errors: Vec<String>,
    pub warning: Option<String>,
    pub duplicate_id: Option<String>,
    /// Number of redirects requested by finished runs.
    pub redirects: usize,
}

impl MintSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an update.
    pub fn apply(&mut self, update: MintUpdate) {
        match update {
            MintUpdate::Started => {
                self.errors.clear();
                self.warning = None;
                self.duplicate_id = None;
                self.stage = MintStage::Validating;
            }
            MintUpdate::Stage(stage) => self.stage = stage,
            MintUpdate::Failed {
                errors,
                duplicate_id,
                warning,
            } => {
                self.errors = errors;
                self.duplicate_id = duplicate_id;
                self.warning = warning;
                self.stage = MintStage::Idle;
            }
            MintUpdate::Warning(warning) => {
                self.warning = Some(warning);
                self.stage = MintStage::Idle;
            }
            MintUpdate::Redirect => {
                self.stage = MintStage::Idle;
                self.redirects += 1;
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drop the session of an unmounted view. The redirect count survives.
    pub fn discard(&mut self) {
        *self = Self {
            redirects: self.redirects,
            ..Self::default()
        };
    }
}

/// Sends session updates to the store while the owning view is alive.
///
/// Once the liveness token is cancelled every update is dropped.
#[derive(Debug, Clone)]
pub struct SessionReporter {
    action_tx: mpsc::UnboundedSender<Action>,
    liveness: CancellationToken,
}

impl SessionReporter {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>, liveness: CancellationToken) -> Self {
        Self {
            action_tx,
            liveness,
        }
    }

    /// Whether the owning view is still mounted.
    pub fn is_live(&self) -> bool {
        !self.liveness.is_cancelled()
    }

    /// The token that is cancelled on teardown.
    pub fn liveness(&self) -> &CancellationToken {
        &self.liveness
    }

    /// Send an update. Returns `false` if it was suppressed.
    pub fn emit(&self, update: MintUpdate) -> bool {
        if !self.is_live() {
            return false;
        }
        self.action_tx.send(Action::Mint(update)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_started_clears_previous_run() {
        let mut session = MintSession::new();
        session.apply(MintUpdate::Failed {
            errors: vec!["bad".to_string()],
            duplicate_id: Some("7".to_string()),
            warning: Some("careful".to_string()),
        });
        assert!(session.has_errors());
        assert_eq!(session.stage, MintStage::Idle);

        session.apply(MintUpdate::Started);
        assert_eq!(session.stage, MintStage::Validating);
        assert!(session.errors.is_empty());
        assert!(session.warning.is_none());
        assert!(session.duplicate_id.is_none());
    }

    #[test]
    fn test_warning_and_redirect_return_to_idle() {
        let mut session = MintSession::new();
        session.apply(MintUpdate::Stage(MintStage::Finalizing));
        assert!(session.stage.is_busy());

        session.apply(MintUpdate::Warning("still confirming".to_string()));
        assert_eq!(session.stage, MintStage::Idle);
        assert_eq!(session.warning.as_deref(), Some("still confirming"));

        session.apply(MintUpdate::Redirect);
        assert_eq!(session.redirects, 1);
        assert!(!session.has_errors());
    }

    #[test]
    fn test_discard_resets_busy_session() {
        let mut session = MintSession::new();
        session.apply(MintUpdate::Redirect);
        session.apply(MintUpdate::Started);
        session.apply(MintUpdate::Stage(MintStage::Finalizing));

        session.discard();
        assert_eq!(session.stage, MintStage::Idle);
        assert!(!session.stage.is_busy());
        assert_eq!(session.redirects, 1);
    }

    #[test]
    fn test_reporter_suppresses_after_teardown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let reporter = SessionReporter::new(tx, token.clone());

        assert!(reporter.emit(MintUpdate::Started));
        token.cancel();
        assert!(!reporter.is_live());
        assert!(!reporter.emit(MintUpdate::Redirect));

        assert!(matches!(rx.try_recv(), Ok(Action::Mint(MintUpdate::Started))));
        assert!(rx.try_recv().is_err());
    }
}
