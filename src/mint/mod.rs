//! Strategy minting.
//!
//! A mint run validates strategy text with the backend, has the user's
//! wallet send a `mintStrategy` transaction, registers the transaction with
//! the backend and polls until the mint is confirmed. Progress is published
//! as [`MintUpdate`]s that the store folds into a [`MintSession`].

mod outcome;
mod session;
mod workflow;

pub use outcome::{MintFailure, MintOutcome};
pub use session::{MintSession, MintStage, MintUpdate, SessionReporter};
pub use workflow::{
    ALREADY_RUNNING, AUTH_REQUIRED, CONFIRMATION_FAILED, CONFIRMATION_PENDING, EMPTY_STRATEGY,
    MINT_SUBMISSION_FAILED, MintWorkflow, NO_ACCOUNTS, REGISTRATION_FAILED,
};
