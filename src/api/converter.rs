//! Data conversion utilities for backend responses.
//!
//! The backend is loose about types (ids arrive as numbers or strings, the
//! compressed payload as a string or a JSON object), so responses are read
//! as `serde_json::Value` and normalized here.

use super::types::{MintStatus, MintStatusReport, RegisteredStrategy, StrategySummary, ValidationResult};
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Fallback message when a failed validation carries no detail.
pub const GENERIC_VALIDATION_ERROR: &str = "Failed to validate strategy";

/// Converts backend responses to internal types.
pub struct DataConverter;

impl DataConverter {
    /// Convert a validation response body.
    ///
    /// `success` is whether the HTTP status was 2xx. A non-success response is
    /// always invalid; its errors come from `errors[]`, then `message`/`error`,
    /// then a generic message.
    pub fn convert_validation(success: bool, body: &Value) -> ValidationResult {
        let valid = success && body.get("valid").and_then(Value::as_bool).unwrap_or(false);

        let errors = if valid {
            Vec::new()
        } else {
            Self::extract_errors(body)
        };

        ValidationResult {
            valid,
            errors,
            compressed: body.get("compressed").and_then(Self::payload_string),
            duplicate_id: Self::field_string(body, &["duplicateId", "duplicate_id"]),
            warning: Self::field_string(body, &["warning"]),
        }
    }

    /// Pull human-readable errors out of an error body.
    pub fn extract_errors(body: &Value) -> Vec<String> {
        if let Some(list) = body.get("errors").and_then(Value::as_array) {
            let errors: Vec<String> = list.iter().filter_map(Self::scalar_string).collect();
            if !errors.is_empty() {
                return errors;
            }
        }

        match Self::field_string(body, &["message", "error"]) {
            Some(message) => vec![message],
            None => vec![GENERIC_VALIDATION_ERROR.to_string()],
        }
    }

    /// Convert a registration response body.
    pub fn convert_registration(body: &Value) -> Option<RegisteredStrategy> {
        let id = body
            .get("id")
            .or_else(|| body.get("strategy").and_then(|s| s.get("id")))
            .and_then(Self::scalar_string)?;
        Some(RegisteredStrategy { id })
    }

    /// Convert a mint status response body.
    pub fn convert_mint_status(body: &Value) -> MintStatusReport {
        let status = body
            .get("mint_status")
            .and_then(Value::as_str)
            .map(MintStatus::parse)
            .unwrap_or_default();

        MintStatusReport {
            status,
            token_id: body.get("nft_token_id").and_then(Self::scalar_string),
        }
    }

    /// Convert a strategy list body, either a bare array or `{"strategies": [...]}`.
    pub fn convert_strategies(body: &Value) -> Vec<StrategySummary> {
        let items = body
            .as_array()
            .or_else(|| body.get("strategies").and_then(Value::as_array));

        items
            .map(|items| items.iter().filter_map(Self::convert_strategy).collect())
            .unwrap_or_default()
    }

    fn convert_strategy(item: &Value) -> Option<StrategySummary> {
        let id = item.get("id").and_then(Self::scalar_string)?;

        Some(StrategySummary {
            id,
            name: Self::field_string(item, &["name", "title"]),
            mint_status: item
                .get("mint_status")
                .and_then(Value::as_str)
                .map(MintStatus::parse)
                .unwrap_or_default(),
            token_id: item.get("nft_token_id").and_then(Self::scalar_string),
            tx_hash: Self::field_string(item, &["tx_hash", "txHash"]),
            created_at: item
                .get("created_at")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc)),
        })
    }

    /// First non-empty string-ish value among the given keys.
    fn field_string(body: &Value, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| body.get(*key))
            .find_map(Self::scalar_string)
    }

    fn scalar_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn payload_string(value: &Value) -> Option<String> {
        match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
