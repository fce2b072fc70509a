//! Model Types - prediction output and error taxonomy

use serde::{Deserialize, Serialize};

use crate::logic::features::LayoutMismatchError;

// ============================================================================
// PREDICTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMethod {
    /// Scaler + regression model
    Model,
    /// Constant safety heuristic
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Always >= 0
    pub predicted_near_accidents_per_hour: f64,
    pub method: PredictionMethod,
    pub inference_time_us: u64,
}

/// Predictor status for logs / `--json` output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub inference_count: u64,
    pub fallback_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Failure of one inference attempt. Always absorbed by the predictor.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InferenceError {
    #[error("Model not loaded")]
    NotLoaded,
    #[error("Shape error: {0}")]
    Shape(String),
    #[error("Inference failed: {0}")]
    Runtime(String),
    #[error("Non-finite model output: {0}")]
    NonFinite(f64),
}

/// Failure while loading the model or scaler at startup. Never fatal.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error(transparent)]
    Layout(#[from] LayoutMismatchError),
    #[error("Failed to load model: {0}")]
    Model(String),
}
