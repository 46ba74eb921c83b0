//! Bearer credential acquisition.

use crate::config::AuthConfig;
use crate::error::Result;
use async_trait::async_trait;

/// Produces the bearer credential for the current user session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The current bearer token, or `None` when the user is not signed in.
    async fn token(&self) -> Result<Option<String>>;
}

/// Auth provider backed by configuration or an environment variable.
#[derive(Debug, Clone)]
pub struct StaticTokenAuth {
    token: Option<String>,
    token_env: String,
}

impl StaticTokenAuth {
    /// Create a provider from the auth configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            token: config.token.clone(),
            token_env: config.token_env.clone(),
        }
    }

    /// Create a provider holding a fixed token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            token_env: String::new(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn token(&self) -> Result<Option<String>> {
        let token = non_blank(self.token.as_deref()).or_else(|| {
            if self.token_env.is_empty() {
                None
            } else {
                non_blank(std::env::var(&self.token_env).ok().as_deref())
            }
        });

        Ok(token)
    }
}

fn non_blank(token: Option<&str>) -> Option<String> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
