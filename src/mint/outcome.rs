//! How a mint run ended.

/// Classification of a failed mint run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintFailure {
    /// Empty or oversized input, missing credential, or a run already in flight.
    Precondition,
    /// The backend rejected the strategy.
    ValidationRejected,
    /// The wallet has no accounts to send from.
    WalletNoAccounts,
    /// The wallet failed to sign or broadcast the mint transaction.
    MintSubmissionFailed,
    /// The backend did not accept the sent transaction.
    RegistrationFailed,
    /// The backend reported the mint as failed on-chain.
    ConfirmationFailed,
    /// Anything not classified above.
    Unexpected,
}

/// Terminal result of a mint run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintOutcome {
    /// Minted and confirmed.
    Success {
        strategy_id: String,
        token_id: String,
    },
    /// Failed; the session shows the errors.
    Failed {
        kind: MintFailure,
        errors: Vec<String>,
        duplicate_id: Option<String>,
    },
    /// Validated, but no wallet was available to mint with.
    SoftSkipped,
    /// Registered, but not confirmed in time.
    TimedOut { strategy_id: String, warning: String },
    /// The owning view was torn down mid-run.
    Cancelled,
}

impl MintOutcome {
    pub(crate) fn failed(kind: MintFailure, error: impl Into<String>) -> Self {
        Self::Failed {
            kind,
            errors: vec![error.into()],
            duplicate_id: None,
        }
    }

    /// The failure kind, if this run failed.
    pub fn failure(&self) -> Option<MintFailure> {
        match self {
            Self::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the run ends with the user sent to the strategy list.
    pub fn redirects(&self) -> bool {
        matches!(
            self,
            Self::Success { .. } | Self::SoftSkipped | Self::TimedOut { .. }
        )
    }
}
