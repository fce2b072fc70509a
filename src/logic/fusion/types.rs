//! Fusion Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::logic::air_quality::{AqiValue, ReductionDecision};
use crate::logic::model::PredictionResult;
use crate::logic::router::RouteDecision;
use crate::logic::weather::{SensorSnapshot, WeatherRisk};

/// Terminal artifact of one decision cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalDecision {
    pub speed_limit_kmh: i32,
    pub justification: String,
}

/// Everything observed while producing one `FinalDecision`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub cycle_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub snapshot: SensorSnapshot,
    pub risk: WeatherRisk,
    pub route: RouteDecision,
    /// `None` when the router skipped the predictor
    pub prediction: Option<PredictionResult>,
    pub weather_reduction_kmh: u32,
    pub aqi: Option<AqiValue>,
    pub aqi_reduction: ReductionDecision,
    pub decision: FinalDecision,
}
