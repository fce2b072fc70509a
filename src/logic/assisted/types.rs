//! Assisted Service Types

use serde::{Deserialize, Serialize};

/// Which path produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Assisted,
    Fallback,
}

/// The two call shapes the engine makes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// YES/NO: should the near-accident predictor run
    Route,
    /// Integer km/h reduction for an AQI value
    Reduction,
}

/// One deterministic request to the assisted service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistedRequest {
    pub kind: RequestKind,
    pub prompt: String,
}

/// Assisted-service error types. Every variant ends in a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ServiceError {
    /// No credential configured
    #[error("Assisted service not configured")]
    NotConfigured,
    /// Credential rejected
    #[error("Assisted service rejected the credential")]
    Unauthorized,
    /// Call exceeded the configured timeout
    #[error("Assisted service timed out")]
    Timeout,
    /// Transport error
    #[error("Network error: {0}")]
    Network(String),
    /// Unexpected HTTP status
    #[error("Assisted service returned HTTP {0}")]
    Status(u16),
    /// Reply could not be interpreted
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// External reasoning service: request text in, short text out.
pub trait AssistedService: Send + Sync {
    fn complete(&self, request: &AssistedRequest) -> Result<String, ServiceError>;
}
