//! Wallet capability.
//!
//! The mint workflow probes for a wallet once per mint. Without one the
//! strategy is validated but not minted; with one, the wallet supplies the
//! sending account and signs and broadcasts the mint transaction.

mod calldata;
mod rpc;

pub use calldata::encode_mint;
pub use rpc::JsonRpcWallet;

use crate::config::WalletConfig;
use crate::error::{Error, Result};
use alloy_primitives::{Address, Bytes, TxHash};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// A contract call for the wallet to sign and send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
}

/// Signs and submits transactions on behalf of the user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts the wallet is willing to send from.
    async fn request_accounts(&self) -> Result<Vec<Address>>;

    /// Sign and broadcast a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash>;
}

/// Result of probing for a wallet.
#[derive(Clone)]
pub enum WalletAvailability {
    /// No wallet-capable environment; minting is skipped.
    Unavailable,
    /// A wallet is present.
    Available(Arc<dyn WalletProvider>),
}

impl WalletAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl fmt::Debug for WalletAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "Unavailable"),
            Self::Available(_) => write!(f, "Available"),
        }
    }
}

/// Detects whether a wallet can be used.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletProbe: Send + Sync {
    async fn probe(&self) -> WalletAvailability;
}

/// Probe backed by configuration: a wallet is available exactly when an RPC
/// endpoint is configured.
pub struct ConfiguredWalletProbe {
    wallet: Option<Arc<JsonRpcWallet>>,
}

impl ConfiguredWalletProbe {
    /// Create the probe, building the JSON-RPC client if an endpoint is set.
    pub fn from_config(config: &WalletConfig) -> Result<Self> {
        let wallet = match config.rpc_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(Arc::new(JsonRpcWallet::new(
                url,
                Duration::from_secs(config.timeout_secs),
            )?)),
            _ => None,
        };
        Ok(Self { wallet })
    }
}

#[async_trait]
impl WalletProbe for ConfiguredWalletProbe {
    async fn probe(&self) -> WalletAvailability {
        match &self.wallet {
            Some(wallet) => WalletAvailability::Available(wallet.clone()),
            None => WalletAvailability::Unavailable,
        }
    }
}

/// Parse the configured strategy contract address.
pub fn contract_address(config: &WalletConfig) -> Result<Address> {
    Address::from_str(config.contract_address.trim()).map_err(|e| {
        Error::config(format!(
            "invalid contract address '{}': {}",
            config.contract_address, e
        ))
    })
}
