//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden from the environment (or a `.env` file).

use std::time::Duration;

/// Environment variable holding the assisted-service credential.
/// Absent or empty = assisted paths disabled, fallback-only.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default assisted-service endpoint
pub const DEFAULT_ASSISTED_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default assisted-service model
pub const DEFAULT_ASSISTED_MODEL: &str = "gemini-2.5-flash";

/// Default timeout for one assisted call (seconds)
pub const DEFAULT_ASSISTED_TIMEOUT_SECS: u64 = 5;

/// Default path of the trained near-accident model
pub const DEFAULT_MODEL_PATH: &str = "models/nn_model.onnx";

/// Default path of the fitted feature-scaling transform
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Speed Limit Advisor";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the assisted-service credential, if any
pub fn get_api_key() -> Option<String> {
    std::env::var(API_KEY_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get assisted-service base URL from environment or use default
pub fn get_assisted_base_url() -> String {
    std::env::var("ASSISTED_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_ASSISTED_BASE_URL.to_string())
}

/// Get assisted-service model name from environment or use default
pub fn get_assisted_model() -> String {
    std::env::var("ASSISTED_MODEL")
        .unwrap_or_else(|_| DEFAULT_ASSISTED_MODEL.to_string())
}

/// Get assisted-call timeout from environment or use default
pub fn get_assisted_timeout() -> Duration {
    let secs = std::env::var("ASSISTED_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_ASSISTED_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

/// Kill switch for the assisted paths (enabled unless set to false/0)
pub fn is_assisted_enabled() -> bool {
    std::env::var("ASSISTED_ENABLED")
        .map(|s| s.to_lowercase() != "false" && s != "0")
        .unwrap_or(true)
}

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get scaler path from environment or use default
pub fn get_scaler_path() -> String {
    std::env::var("SCALER_PATH")
        .unwrap_or_else(|_| DEFAULT_SCALER_PATH.to_string())
}
