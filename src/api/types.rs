//! Backend payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of asking the backend to validate a strategy.
///
/// Non-success HTTP responses are folded into `valid == false` with the
/// errors the backend reported, so callers only branch on `valid`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    /// Canonicalized strategy payload to encode on-chain instead of the raw text.
    pub compressed: Option<String>,
    /// Identifier of an already minted strategy that collides with this one.
    pub duplicate_id: Option<String>,
    pub warning: Option<String>,
}

impl ValidationResult {
    /// A passing validation.
    pub fn accepted(compressed: Option<String>) -> Self {
        Self {
            valid: true,
            compressed,
            ..Default::default()
        }
    }

    /// A rejected validation with the given errors.
    pub fn rejected(errors: Vec<String>) -> Self {
        Self {
            valid: false,
            errors,
            ..Default::default()
        }
    }
}

/// A strategy registered with the backend after its mint transaction was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredStrategy {
    pub id: String,
}

/// On-chain confirmation state of a mint as tracked by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    #[default]
    Pending,
    Confirmed,
    Failed,
}

impl MintStatus {
    /// Parse a backend status string; anything unknown counts as pending.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "confirmed" => Self::Confirmed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for MintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// A single mint status poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintStatusReport {
    pub status: MintStatus,
    pub token_id: Option<String>,
}

impl MintStatusReport {
    pub fn pending() -> Self {
        Self {
            status: MintStatus::Pending,
            token_id: None,
        }
    }

    pub fn confirmed(token_id: impl Into<String>) -> Self {
        Self {
            status: MintStatus::Confirmed,
            token_id: Some(token_id.into()),
        }
    }

    pub fn failed() -> Self {
        Self {
            status: MintStatus::Failed,
            token_id: None,
        }
    }
}

/// A strategy owned by the current user, as shown in the strategy list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub id: String,
    pub name: Option<String>,
    pub mint_status: MintStatus,
    pub token_id: Option<String>,
    pub tx_hash: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl StrategySummary {
    /// Label for list rows: the name if present, otherwise the id.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
