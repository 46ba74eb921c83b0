//! Gammabots backend integration.
//!
//! This module provides the `BackendClient` capability used by the mint
//! workflow and the strategy list, an HTTP implementation that attaches the
//! bearer credential and API key to every request, and data conversion for
//! the backend's loosely typed payloads.

mod client;
mod converter;
mod types;

#[cfg(test)]
pub use client::MockBackendClient;
pub use client::{BackendClient, HttpBackend, HttpBackendBuilder};
pub use converter::{DataConverter, GENERIC_VALIDATION_ERROR};
pub use types::{MintStatus, MintStatusReport, RegisteredStrategy, StrategySummary, ValidationResult};
