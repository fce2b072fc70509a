//! Assisted Router
//!
//! Decides whether the near-accident predictor runs at all. The assisted
//! service is asked first; any failure or unclear reply falls back to
//! `is_dark || is_black_ice`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::assisted::{AssistedRequest, AssistedService, DecisionSource, RequestKind, ServiceError};
use super::weather::{
    SensorSnapshot, WeatherRisk, BLACK_ICE_WATER_THRESHOLD_UM, DARKNESS_THRESHOLD_MILLILUX,
    FREEZING_POINT_C,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub should_run_predictor: bool,
    pub source: DecisionSource,
    /// Literal reply text, when the service answered
    pub response: Option<String>,
    /// Why the fallback was taken
    pub fallback_reason: Option<String>,
}

impl RouteDecision {
    pub fn fallback(risk: &WeatherRisk, reason: impl Into<String>) -> Self {
        Self {
            should_run_predictor: fallback_route(risk),
            source: DecisionSource::Fallback,
            response: None,
            fallback_reason: Some(reason.into()),
        }
    }
}

pub struct AssistedRouter {
    service: Option<Arc<dyn AssistedService>>,
}

impl AssistedRouter {
    pub fn new(service: Option<Arc<dyn AssistedService>>) -> Self {
        Self { service }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn route(&self, snapshot: &SensorSnapshot, risk: &WeatherRisk) -> RouteDecision {
        let attempt = match &self.service {
            Some(service) => service.complete(&route_request(snapshot)),
            None => Err(ServiceError::NotConfigured),
        };

        if let Err(e) = &attempt {
            if *e != ServiceError::NotConfigured {
                log::warn!("Router error (using fallback): {}", e);
            }
        }

        let decision = resolve_route(risk, attempt);

        match decision.source {
            DecisionSource::Assisted => log::info!(
                "Router said '{}', {} near-accident predictor",
                decision.response.as_deref().unwrap_or_default().trim(),
                if decision.should_run_predictor { "running" } else { "skipping" }
            ),
            DecisionSource::Fallback => log::debug!(
                "Router fallback ({}): run predictor = {}",
                decision.fallback_reason.as_deref().unwrap_or_default(),
                decision.should_run_predictor
            ),
        }

        decision
    }
}

// ============================================================================
// PURE MAPPING
// ============================================================================

pub fn fallback_route(risk: &WeatherRisk) -> bool {
    risk.is_dark || risk.is_black_ice
}

/// Deterministic request for one snapshot
pub fn route_request(snapshot: &SensorSnapshot) -> AssistedRequest {
    let prompt = format!(
        "You gate a near-accident prediction model for a road speed-limit system.\n\
         Sensor data:\n\
         - Illuminance: {} millilux\n\
         - Water level: {} micrometers\n\
         - Temperature: {} Celsius\n\
         Rules:\n\
         - Darkness is illuminance < {}.\n\
         - Black ice risk is water level > {} AND temperature < {}.\n\
         Answer YES if darkness OR black ice risk is present, otherwise NO.\n\
         Reply with YES or NO only.",
        snapshot.illuminance,
        snapshot.water_level,
        snapshot.temperature,
        DARKNESS_THRESHOLD_MILLILUX,
        BLACK_ICE_WATER_THRESHOLD_UM,
        FREEZING_POINT_C,
    );

    AssistedRequest { kind: RequestKind::Route, prompt }
}

/// YES anywhere = run; a standalone NO = skip; anything else is malformed.
pub fn parse_route_response(text: &str) -> Result<bool, ServiceError> {
    let upper = text.trim().to_uppercase();

    if upper.contains("YES") {
        return Ok(true);
    }

    if upper.split(|c: char| !c.is_ascii_alphabetic()).any(|token| token == "NO") {
        return Ok(false);
    }

    Err(ServiceError::Malformed(format!("expected YES or NO, got '{}'", text.trim())))
}

/// Total mapping from one assisted attempt to a routing decision
pub fn resolve_route(risk: &WeatherRisk, attempt: Result<String, ServiceError>) -> RouteDecision {
    let text = match attempt {
        Ok(text) => text,
        Err(e) => return RouteDecision::fallback(risk, e.to_string()),
    };

    match parse_route_response(&text) {
        Ok(should_run_predictor) => RouteDecision {
            should_run_predictor,
            source: DecisionSource::Assisted,
            response: Some(text),
            fallback_reason: None,
        },
        Err(e) => RouteDecision {
            response: Some(text),
            ..RouteDecision::fallback(risk, e.to_string())
        },
    }
}
