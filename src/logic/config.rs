//! Engine Configuration
//!
//! Everything the engine reads from the outside world at startup.
//! Built once by `EngineConfig::from_env()` and never mutated afterwards.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Assisted-service credential. `None` = fallback-only.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub assisted_base_url: String,
    pub assisted_model: String,
    pub assisted_timeout: Duration,
    /// Kill switch: when false the credential is ignored
    pub assisted_enabled: bool,
    pub model_path: String,
    pub scaler_path: String,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: constants::get_api_key(),
            assisted_base_url: constants::get_assisted_base_url(),
            assisted_model: constants::get_assisted_model(),
            assisted_timeout: constants::get_assisted_timeout(),
            assisted_enabled: constants::is_assisted_enabled(),
            model_path: constants::get_model_path(),
            scaler_path: constants::get_scaler_path(),
        }
    }

    /// Credential to use for assisted calls, honoring the kill switch
    pub fn assisted_credential(&self) -> Option<&str> {
        if !self.assisted_enabled {
            return None;
        }
        self.api_key.as_deref()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            assisted_base_url: constants::DEFAULT_ASSISTED_BASE_URL.to_string(),
            assisted_model: constants::DEFAULT_ASSISTED_MODEL.to_string(),
            assisted_timeout: Duration::from_secs(constants::DEFAULT_ASSISTED_TIMEOUT_SECS),
            assisted_enabled: true,
            model_path: constants::DEFAULT_MODEL_PATH.to_string(),
            scaler_path: constants::DEFAULT_SCALER_PATH.to_string(),
        }
    }
}
