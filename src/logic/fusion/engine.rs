//! Decision Fusion Engine
//!
//! Weather → router → (maybe) predictor, and AQI source → advisor, fused
//! into one capped limit. The most severe single reduction wins; reductions
//! never add up.

use std::sync::Arc;

use super::types::{DecisionTrace, FinalDecision};
use crate::logic::air_quality::{
    AqiSource, AqiValue, ReductionAdvisor, ReductionDecision, SimulatedAqiSource,
};
use crate::logic::assisted::{self, DecisionSource};
use crate::logic::config::EngineConfig;
use crate::logic::model::{
    self, predict_fallback, weather_reduction_for, NearAccidentPredictor, PredictionMethod,
    PredictionResult, PredictorStatus,
};
use crate::logic::router::{AssistedRouter, RouteDecision};
use crate::logic::weather::{self, SensorSnapshot, WeatherRisk};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default limit, and the ceiling of every decision
pub const BASE_SPEED_LIMIT_KMH: i32 = 80;

/// Floor of every decision
pub const MIN_SPEED_LIMIT_KMH: i32 = 0;

pub const DARKNESS_NOTE: &str = "Darkness (illuminance < 500 millilux)";
pub const BLACK_ICE_NOTE: &str = "Danger of black ice (water > 1000 µm & temp < 0°C)";
pub const DEFAULT_JUSTIFICATION: &str = "Default speed limit (80 km/h) due to no detected risks.";
pub const MAINTAINED_NOTE: &str =
    " (Speed limit maintained at 80 km/h as risk is within acceptable limits for detected conditions).";

// ============================================================================
// ENGINE
// ============================================================================

pub struct FusionEngine {
    router: AssistedRouter,
    predictor: NearAccidentPredictor,
    aqi_source: Arc<dyn AqiSource>,
    advisor: ReductionAdvisor,
}

/// Weather half of one cycle
struct WeatherAssessment {
    prediction: Option<PredictionResult>,
    reduction_kmh: u32,
}

impl FusionEngine {
    pub fn new(
        router: AssistedRouter,
        predictor: NearAccidentPredictor,
        aqi_source: Arc<dyn AqiSource>,
        advisor: ReductionAdvisor,
    ) -> Self {
        Self { router, predictor, aqi_source, advisor }
    }

    /// Wire everything from configuration: assisted client (if a credential
    /// is set), model artifacts (if present), simulated AQI feed.
    pub fn from_config(config: &EngineConfig) -> Self {
        let service = assisted::build_service(config);
        let artifacts = model::load_artifacts(&config.model_path, &config.scaler_path);

        Self::new(
            AssistedRouter::new(service.clone()),
            NearAccidentPredictor::new(artifacts),
            Arc::new(SimulatedAqiSource::new()),
            ReductionAdvisor::new(service),
        )
    }

    /// No assisted service, no model
    pub fn fallback_only(aqi_source: Arc<dyn AqiSource>) -> Self {
        Self::new(
            AssistedRouter::fallback_only(),
            NearAccidentPredictor::fallback_only(),
            aqi_source,
            ReductionAdvisor::fallback_only(),
        )
    }

    pub fn predictor_status(&self) -> PredictorStatus {
        self.predictor.status()
    }

    /// Entry point: `(speed_limit_kmh, justification)`
    pub fn decide(
        &self,
        illuminance: f64,
        water_level: f64,
        temperature: f64,
        hour_of_day: u8,
    ) -> (i32, String) {
        let decision = self.decide_snapshot(SensorSnapshot::new(
            illuminance,
            water_level,
            temperature,
            hour_of_day,
        ));
        (decision.speed_limit_kmh, decision.justification)
    }

    pub fn decide_snapshot(&self, snapshot: SensorSnapshot) -> FinalDecision {
        self.decide_traced(snapshot).0
    }

    pub fn decide_traced(&self, snapshot: SensorSnapshot) -> (FinalDecision, DecisionTrace) {
        let risk = weather::evaluate(&snapshot);

        let route = self.router.route(&snapshot, &risk);
        let assessment = self.assess_weather(&snapshot, &route);

        let aqi = self.aqi_source.aqi_for_hour(snapshot.hour_of_day);
        let aqi_reduction = self.advisor.advise(aqi);

        fuse(snapshot, risk, route, assessment, Some(aqi), aqi_reduction)
    }

    /// Same decision, with the router call and the AQI advisor call running
    /// concurrently on the blocking pool. A failed task maps to the same
    /// fallbacks as a failed service call.
    pub async fn decide_concurrent(
        self: Arc<Self>,
        snapshot: SensorSnapshot,
    ) -> (FinalDecision, DecisionTrace) {
        let risk = weather::evaluate(&snapshot);

        let route_engine = Arc::clone(&self);
        let route_task = tokio::task::spawn_blocking(move || {
            route_engine.router.route(&snapshot, &risk)
        });

        let air_engine = Arc::clone(&self);
        let air_task = tokio::task::spawn_blocking(move || {
            let aqi = air_engine.aqi_source.aqi_for_hour(snapshot.hour_of_day);
            (aqi, air_engine.advisor.advise(aqi))
        });

        let (route, air) = tokio::join!(route_task, air_task);

        let route = route.unwrap_or_else(|e| {
            log::warn!("Router task failed ({}), using fallback", e);
            RouteDecision::fallback(&risk, e.to_string())
        });

        // No AQI reading means no air-quality reduction this cycle
        let (aqi, aqi_reduction) = match air {
            Ok((aqi, reduction)) => (Some(aqi), reduction),
            Err(e) => {
                log::warn!("AQI task failed ({}), skipping air-quality reduction", e);
                (None, ReductionDecision { amount_kmh: 0, source: DecisionSource::Fallback })
            }
        };

        let predictor_engine = Arc::clone(&self);
        let predictor_route = route.clone();
        let assessment = tokio::task::spawn_blocking(move || {
            predictor_engine.assess_weather(&snapshot, &predictor_route)
        })
        .await
        .unwrap_or_else(|e| {
            log::warn!("Predictor task failed ({}), using fallback", e);
            fallback_assessment(&risk, &route)
        });

        fuse(snapshot, risk, route, assessment, aqi, aqi_reduction)
    }

    fn assess_weather(&self, snapshot: &SensorSnapshot, route: &RouteDecision) -> WeatherAssessment {
        if !route.should_run_predictor {
            return WeatherAssessment { prediction: None, reduction_kmh: 0 };
        }

        let prediction = self.predictor.predict(snapshot);
        WeatherAssessment {
            reduction_kmh: weather_reduction_for(prediction.predicted_near_accidents_per_hour),
            prediction: Some(prediction),
        }
    }
}

fn fallback_assessment(risk: &WeatherRisk, route: &RouteDecision) -> WeatherAssessment {
    if !route.should_run_predictor {
        return WeatherAssessment { prediction: None, reduction_kmh: 0 };
    }

    let rate = predict_fallback(risk);
    WeatherAssessment {
        prediction: Some(PredictionResult {
            predicted_near_accidents_per_hour: rate,
            method: PredictionMethod::Fallback,
            inference_time_us: 0,
        }),
        reduction_kmh: weather_reduction_for(rate),
    }
}

// ============================================================================
// FUSION
// ============================================================================

fn fuse(
    snapshot: SensorSnapshot,
    risk: WeatherRisk,
    route: RouteDecision,
    assessment: WeatherAssessment,
    aqi: Option<AqiValue>,
    aqi_reduction: ReductionDecision,
) -> (FinalDecision, DecisionTrace) {
    let mut fragments = weather_fragments(&risk, assessment.prediction.as_ref(), assessment.reduction_kmh);
    fragments.extend(aqi.and_then(|aqi| aqi_fragment(aqi, &aqi_reduction)));

    let speed_limit_kmh = fuse_limits(assessment.reduction_kmh, aqi_reduction.amount_kmh);
    let decision = FinalDecision {
        speed_limit_kmh,
        justification: build_justification(&fragments, speed_limit_kmh),
    };

    let trace = DecisionTrace {
        cycle_id: uuid::Uuid::new_v4(),
        decided_at: chrono::Utc::now(),
        snapshot,
        risk,
        route,
        prediction: assessment.prediction,
        weather_reduction_kmh: assessment.reduction_kmh,
        aqi,
        aqi_reduction,
        decision: decision.clone(),
    };

    log::info!(
        "Decision {}: {} km/h ({})",
        trace.cycle_id, decision.speed_limit_kmh, decision.justification
    );

    (decision, trace)
}

/// Most severe single reduction, capped to [MIN, BASE]
pub fn fuse_limits(weather_reduction_kmh: u32, aqi_reduction_kmh: u32) -> i32 {
    let base = i64::from(BASE_SPEED_LIMIT_KMH);
    let mut limit = base;

    for reduction in [weather_reduction_kmh, aqi_reduction_kmh] {
        if reduction > 0 {
            limit = limit.min(base - i64::from(reduction));
        }
    }

    limit.clamp(i64::from(MIN_SPEED_LIMIT_KMH), base) as i32
}

pub fn weather_fragments(
    risk: &WeatherRisk,
    prediction: Option<&PredictionResult>,
    weather_reduction_kmh: u32,
) -> Vec<String> {
    let mut fragments = Vec::new();

    if risk.is_dark {
        fragments.push(DARKNESS_NOTE.to_string());
    }
    if risk.is_black_ice {
        fragments.push(BLACK_ICE_NOTE.to_string());
    }

    if let Some(prediction) = prediction {
        if weather_reduction_kmh > 0 {
            let method = match prediction.method {
                PredictionMethod::Model => "model",
                PredictionMethod::Fallback => "safety heuristic",
            };
            fragments.push(format!(
                "Near-accident {} predicts {:.1} near-accidents/hr, reducing speed by {} km/h.",
                method, prediction.predicted_near_accidents_per_hour, weather_reduction_kmh
            ));
        }
    }

    fragments
}

pub fn aqi_fragment(aqi: AqiValue, reduction: &ReductionDecision) -> Option<String> {
    if reduction.amount_kmh == 0 {
        return None;
    }

    let source = match reduction.source {
        DecisionSource::Assisted => "assisted",
        DecisionSource::Fallback => "rule-based",
    };

    Some(format!(
        "Poor air quality (AQI: {}) leading to {} km/h reduction by {} recommendation.",
        aqi, reduction.amount_kmh, source
    ))
}

pub fn build_justification(fragments: &[String], speed_limit_kmh: i32) -> String {
    if fragments.is_empty() {
        return DEFAULT_JUSTIFICATION.to_string();
    }

    let mut justification = fragments.join("; ");
    if speed_limit_kmh == BASE_SPEED_LIMIT_KMH {
        justification.push_str(MAINTAINED_NOTE);
    }
    justification
}
