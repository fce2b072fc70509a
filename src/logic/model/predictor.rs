//! Near-Accident Predictor
//!
//! Scaler + regression model when both artifacts are loaded, constant
//! safety heuristic otherwise. Never fails: every inference error lands
//! on the heuristic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::inference::RegressionModel;
use super::scaler::StandardScaler;
use super::types::{InferenceError, PredictionMethod, PredictionResult, PredictorStatus};
use crate::logic::features::FeatureVector;
use crate::logic::weather::{self, SensorSnapshot, WeatherRisk};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Target: at most one near-accident per hour
pub const NEAR_ACCIDENT_TARGET_PER_HOUR: f64 = 1.0;

/// Reduction requested when the target is exceeded
pub const WEATHER_REDUCTION_KMH: u32 = 20;

/// Heuristic rate when a hazard predicate holds (above target)
pub const FALLBACK_HAZARD_RATE: f64 = 1.5;

/// Heuristic rate in clear conditions
pub const FALLBACK_CLEAR_RATE: f64 = 0.2;

// ============================================================================
// ARTIFACTS
// ============================================================================

/// Loaded once at startup, shared read-only
#[derive(Clone)]
pub struct ModelArtifacts {
    pub model: Arc<dyn RegressionModel>,
    pub scaler: Arc<StandardScaler>,
}

// ============================================================================
// PREDICTOR
// ============================================================================

pub struct NearAccidentPredictor {
    artifacts: Option<ModelArtifacts>,
    inference_count: AtomicU64,
    fallback_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl NearAccidentPredictor {
    pub fn new(artifacts: Option<ModelArtifacts>) -> Self {
        Self {
            artifacts,
            inference_count: AtomicU64::new(0),
            fallback_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }

    pub fn fallback_only() -> Self {
        Self::new(None)
    }

    pub fn is_model_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn predict(&self, snapshot: &SensorSnapshot) -> PredictionResult {
        let start_time = Instant::now();

        let (rate, method) = match self.predict_model(snapshot) {
            Ok(rate) => (rate, PredictionMethod::Model),
            Err(InferenceError::NotLoaded) => {
                (predict_fallback(&weather::evaluate(snapshot)), PredictionMethod::Fallback)
            }
            Err(e) => {
                log::warn!("Near-accident model failed ({}), using fallback", e);
                (predict_fallback(&weather::evaluate(snapshot)), PredictionMethod::Fallback)
            }
        };

        let inference_time_us = start_time.elapsed().as_micros() as u64;

        self.inference_count.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);
        if method == PredictionMethod::Fallback {
            self.fallback_count.fetch_add(1, Ordering::Relaxed);
        }

        PredictionResult {
            predicted_near_accidents_per_hour: rate,
            method,
            inference_time_us,
        }
    }

    /// Model path only. Output clamped to >= 0.
    pub fn predict_model(&self, snapshot: &SensorSnapshot) -> Result<f64, InferenceError> {
        let artifacts = self.artifacts.as_ref().ok_or(InferenceError::NotLoaded)?;

        let vector = FeatureVector::from_snapshot(artifacts.scaler.mean(), snapshot);
        log::debug!("Predictor input: {}", vector.to_log_entry());

        let scaled = artifacts.scaler.transform(&vector);
        let raw = artifacts.model.predict(&scaled.to_f32())?;

        if !raw.is_finite() {
            return Err(InferenceError::NonFinite(raw));
        }

        Ok(raw.max(0.0))
    }

    pub fn status(&self) -> PredictorStatus {
        let count = self.inference_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        PredictorStatus {
            model_loaded: self.is_model_loaded(),
            model_name: self.artifacts.as_ref()
                .map(|a| a.model.name().to_string())
                .unwrap_or_else(|| "None".to_string()),
            inference_count: count,
            fallback_count: self.fallback_count.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

// ============================================================================
// FALLBACK & DECISION RULE
// ============================================================================

/// Never under-predicts when a hazard predicate holds
pub fn predict_fallback(risk: &WeatherRisk) -> f64 {
    if risk.any() {
        FALLBACK_HAZARD_RATE
    } else {
        FALLBACK_CLEAR_RATE
    }
}

pub fn weather_reduction_for(predicted_rate: f64) -> u32 {
    if predicted_rate > NEAR_ACCIDENT_TARGET_PER_HOUR {
        WEATHER_REDUCTION_KMH
    } else {
        0
    }
}
