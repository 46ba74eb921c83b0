//! JSON-RPC wallet provider.
//!
//! Talks to a wallet that manages its own accounts and signs on request
//! (EIP-1193 semantics over HTTP): `eth_requestAccounts` to learn the
//! accounts and `eth_sendTransaction` to have the wallet sign and broadcast.

use super::{TransactionRequest, WalletProvider};
use crate::error::{Error, Result};
use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// Wallet reachable over HTTP JSON-RPC.
#[derive(Debug)]
pub struct JsonRpcWallet {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcWallet {
    /// Create a wallet client for the given endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Endpoint this wallet talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(id, method, "wallet rpc call");

        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": method,
                "params": params,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::wallet(format!(
                "{} failed with HTTP status {}",
                method,
                response.status()
            )));
        }

        let envelope: RpcResponse = response.json().await?;
        if let Some(err) = envelope.error {
            return Err(Error::wallet(format!("{} ({})", err.message, err.code)));
        }

        let result = envelope
            .result
            .ok_or_else(|| Error::wallet(format!("{} returned no result", method)))?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl WalletProvider for JsonRpcWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>> {
        self.call("eth_requestAccounts", json!([])).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash> {
        let hash: TxHash = self.call("eth_sendTransaction", json!([&tx])).await?;
        info!(%hash, from = %tx.from, to = %tx.to, "mint transaction sent");
        Ok(hash)
    }
}
