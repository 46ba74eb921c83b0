//! # Gammabots - Strategy Mint Terminal
//!
//! A terminal client for Gammabots: write a trading strategy in plain
//! language, have the backend validate it, mint it as an on-chain token
//! through your wallet, and follow its confirmation.
//!
//! ## Architecture
//!
//! - **App**: Terminal lifecycle, event loop and background tasks
//! - **Mint**: The validate, mint, register and confirm workflow
//! - **API**: Gammabots backend client
//! - **Auth**: Bearer credential acquisition
//! - **Wallet**: Wallet probing, calldata and JSON-RPC submission
//! - **State**: Centralized state management
//! - **Events**: Input handling
//! - **UI**: Layout and rendering logic
//! - **Config**: Configuration management

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod mint;
pub mod state;
pub mod ui;
pub mod wallet;

pub use app::App;
pub use config::Config;
pub use error::{Error, Result};
pub use mint::{MintOutcome, MintSession, MintStage, MintWorkflow, SessionReporter};
