//! Gammabots backend client.

use super::DataConverter;
use super::types::{MintStatusReport, RegisteredStrategy, StrategySummary, ValidationResult};
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use alloy_primitives::TxHash;
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Seconds to wait when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Operations the mint workflow and the strategy list need from the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Validate strategy text. Rejections, including non-success statuses,
    /// come back as `valid == false` rather than as an error.
    async fn validate_strategy(&self, token: &str, strategy: &str) -> Result<ValidationResult>;

    /// Register a sent mint transaction and get the new strategy id.
    async fn register_strategy(&self, token: &str, tx_hash: TxHash) -> Result<RegisteredStrategy>;

    /// Fetch the mint status of a strategy. `None` means the backend could not
    /// answer yet (non-success status).
    async fn mint_status(&self, token: &str, strategy_id: &str) -> Result<Option<MintStatusReport>>;

    /// List the strategies owned by the caller.
    async fn list_strategies(&self, token: &str) -> Result<Vec<StrategySummary>>;
}

/// Builder for creating an HTTP backend client.
pub struct HttpBackendBuilder {
    config: ApiConfig,
}

impl HttpBackendBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the API key attached to every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpBackend> {
        HttpBackend::new(self.config)
    }
}

impl Default for HttpBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Backend client over HTTP.
///
/// Every request carries the caller's bearer token, the configured API key
/// and a fresh `x-request-id`.
pub struct HttpBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    rate_limiter: Mutex<RateLimiter>,
}

impl HttpBackend {
    /// Create a new backend client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
            rate_limiter: Mutex::new(RateLimiter::new(config.rate_limit.max(1))),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4();
        debug!(%request_id, %method, path, "backend request");

        let mut builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header("x-request-id", request_id.to_string());

        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        self.rate_limit().await?;
        Ok(builder.send().await?)
    }

    /// Read a body as JSON, treating empty or non-JSON bodies as `null`.
    async fn read_json(response: Response) -> Result<Value> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
    }

    /// Turn a non-success response into a backend error.
    async fn status_error(response: Response) -> Error {
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            warn!(retry_after, "backend rate limit hit");
            return Error::RateLimited(retry_after);
        }

        let status = response.status().as_u16();
        let message = match Self::read_json(response).await {
            Ok(body) => DataConverter::extract_errors(&body).join("; "),
            Err(e) => e.to_string(),
        };
        Error::backend(status, message)
    }

    /// Apply rate limiting.
    async fn rate_limit(&self) -> Result<()> {
        let mut limiter = self.rate_limiter.lock().await;
        limiter.wait().await
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    async fn validate_strategy(&self, token: &str, strategy: &str) -> Result<ValidationResult> {
        let response = self
            .send(
                self.request(Method::POST, "/strategies/validate", token)
                    .json(&json!({ "strategy": strategy })),
            )
            .await?;

        let success = response.status().is_success();
        if !success {
            warn!(status = %response.status(), "strategy validation rejected");
        }
        let body = Self::read_json(response).await?;
        Ok(DataConverter::convert_validation(success, &body))
    }

    async fn register_strategy(&self, token: &str, tx_hash: TxHash) -> Result<RegisteredStrategy> {
        let response = self
            .send(
                self.request(Method::POST, "/strategies", token)
                    .json(&json!({ "tx_hash": tx_hash })),
            )
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = Self::read_json(response).await?;
        DataConverter::convert_registration(&body)
            .ok_or_else(|| Error::application("Registration response did not include an id"))
    }

    async fn mint_status(&self, token: &str, strategy_id: &str) -> Result<Option<MintStatusReport>> {
        let path = format!("/strategies/{}/mint-status", strategy_id);
        let response = self.send(self.request(Method::GET, &path, token)).await?;

        if !response.status().is_success() {
            debug!(status = %response.status(), strategy_id, "mint status not available yet");
            return Ok(None);
        }

        let body = Self::read_json(response).await?;
        Ok(Some(DataConverter::convert_mint_status(&body)))
    }

    async fn list_strategies(&self, token: &str) -> Result<Vec<StrategySummary>> {
        let response = self
            .send(self.request(Method::GET, "/strategies", token))
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let body = Self::read_json(response).await?;
        Ok(DataConverter::convert_strategies(&body))
    }
}

/// Simple token bucket rate limiter.
struct RateLimiter {
    requests_per_second: u32,
    last_request: Instant,
    tokens: f64,
}

impl RateLimiter {
    fn new(requests_per_second: u32) -> Self {
        Self {
            requests_per_second,
            last_request: Instant::now(),
            tokens: requests_per_second as f64,
        }
    }

    async fn wait(&mut self) -> Result<()> {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_request).as_secs_f64();

        // Replenish tokens
        self.tokens = (self.tokens + elapsed * self.requests_per_second as f64)
            .min(self.requests_per_second as f64);

        if self.tokens < 1.0 {
            let wait_time = (1.0 - self.tokens) / self.requests_per_second as f64;
            tokio::time::sleep(Duration::from_secs_f64(wait_time)).await;
            self.tokens = 1.0;
        }

        self.tokens -= 1.0;
        self.last_request = Instant::now();

        Ok(())
    }
}
