//! Reduction Advisor
//!
//! AQI → km/h reduction. The assisted service is asked first and its reply
//! must be a bare non-negative integer; otherwise the rule table decides.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::source::AqiValue;
use crate::logic::assisted::{
    AssistedRequest, AssistedService, DecisionSource, RequestKind, ServiceError,
};
use crate::logic::fusion::BASE_SPEED_LIMIT_KMH;

// ============================================================================
// RULE TABLE (evaluated top-down, first match wins)
// ============================================================================

pub const AQI_HAZARDOUS: AqiValue = 150;
pub const AQI_UNHEALTHY: AqiValue = 100;
pub const AQI_MODERATE: AqiValue = 50;

pub const REDUCTION_HAZARDOUS_KMH: u32 = 30;
pub const REDUCTION_UNHEALTHY_KMH: u32 = 20;
pub const REDUCTION_MODERATE_KMH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionDecision {
    pub amount_kmh: u32,
    pub source: DecisionSource,
}

pub struct ReductionAdvisor {
    service: Option<Arc<dyn AssistedService>>,
}

impl ReductionAdvisor {
    pub fn new(service: Option<Arc<dyn AssistedService>>) -> Self {
        Self { service }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn advise(&self, aqi: AqiValue) -> ReductionDecision {
        let attempt = match &self.service {
            Some(service) => service.complete(&reduction_request(aqi)),
            None => Err(ServiceError::NotConfigured),
        };

        if let Err(e) = &attempt {
            if !matches!(e, ServiceError::NotConfigured | ServiceError::Malformed(_)) {
                log::warn!("AQI advisor error (using fallback): {}", e);
            }
        }

        let decision = resolve_reduction(aqi, attempt);
        log::debug!(
            "AQI {} -> -{} km/h ({:?})",
            aqi, decision.amount_kmh, decision.source
        );
        decision
    }
}

// ============================================================================
// PURE MAPPING
// ============================================================================

pub fn fallback_reduction(aqi: AqiValue) -> u32 {
    if aqi > AQI_HAZARDOUS {
        REDUCTION_HAZARDOUS_KMH
    } else if aqi > AQI_UNHEALTHY {
        REDUCTION_UNHEALTHY_KMH
    } else if aqi > AQI_MODERATE {
        REDUCTION_MODERATE_KMH
    } else {
        0
    }
}

pub fn reduction_request(aqi: AqiValue) -> AssistedRequest {
    let prompt = format!(
        "You advise a road speed-limit system on air quality.\n\
         Current Air Quality Index (AQI): {}\n\
         Base speed limit: {} km/h\n\
         Guidelines:\n\
         - AQI < {} (good): reduction 0\n\
         - AQI {}-{} (moderate): about {}\n\
         - AQI {}-{} (unhealthy): about {}\n\
         - AQI > {} (hazardous): about {}\n\
         Return ONLY the integer reduction in km/h.",
        aqi,
        BASE_SPEED_LIMIT_KMH,
        AQI_MODERATE,
        AQI_MODERATE, AQI_UNHEALTHY, REDUCTION_MODERATE_KMH,
        AQI_UNHEALTHY, AQI_HAZARDOUS, REDUCTION_UNHEALTHY_KMH,
        AQI_HAZARDOUS, REDUCTION_HAZARDOUS_KMH,
    );

    AssistedRequest { kind: RequestKind::Reduction, prompt }
}

/// Strict: the trimmed reply must be a non-negative integer
pub fn parse_reduction(text: &str) -> Result<u32, ServiceError> {
    text.trim()
        .parse::<u32>()
        .map_err(|e| ServiceError::Malformed(format!("'{}' is not a reduction: {}", text.trim(), e)))
}

pub fn resolve_reduction(aqi: AqiValue, attempt: Result<String, ServiceError>) -> ReductionDecision {
    match attempt.and_then(|text| parse_reduction(&text)) {
        Ok(amount_kmh) => ReductionDecision { amount_kmh, source: DecisionSource::Assisted },
        Err(e) => {
            if let ServiceError::Malformed(_) = e {
                log::warn!("AQI advisor reply unusable (using fallback): {}", e);
            }
            ReductionDecision {
                amount_kmh: fallback_reduction(aqi),
                source: DecisionSource::Fallback,
            }
        }
    }
}
