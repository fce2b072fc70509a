//! Assisted Service Module
//!
//! External reasoning service consulted by the router and the reduction
//! advisor. Absent credential = `None`, and both callers run fallback-only.

pub mod client;
pub mod types;

use std::sync::Arc;

pub use client::AssistedClient;
pub use types::{AssistedRequest, AssistedService, DecisionSource, RequestKind, ServiceError};

use crate::logic::config::EngineConfig;

pub fn build_service(config: &EngineConfig) -> Option<Arc<dyn AssistedService>> {
    match config.assisted_credential() {
        Some(key) => {
            let client = AssistedClient::new(key, config);
            log::info!("Assisted service enabled: {}", client.endpoint());
            Some(Arc::new(client))
        }
        None => {
            log::info!("Assisted service disabled. Using rule-based fallbacks.");
            None
        }
    }
}
