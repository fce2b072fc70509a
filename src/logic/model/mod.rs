//! Model Module - Near-accident prediction
//!
//! Tách logic inference khỏi decision logic.
//! - `scaler`: fitted feature-scaling transform (+ baseline mean)
//! - `inference`: ONNX regression model behind `RegressionModel`
//! - `predictor`: model path with safety fallback

pub mod inference;
pub mod predictor;
pub mod scaler;
pub mod types;

use std::path::Path;
use std::sync::Arc;

pub use inference::{OnnxRegressor, RegressionModel};
pub use predictor::{
    predict_fallback, weather_reduction_for, ModelArtifacts, NearAccidentPredictor,
    NEAR_ACCIDENT_TARGET_PER_HOUR, WEATHER_REDUCTION_KMH,
};
pub use scaler::{ScalerArtifact, StandardScaler};
pub use types::{ArtifactError, InferenceError, PredictionMethod, PredictionResult, PredictorStatus};

/// Load model + scaler once at startup.
///
/// Either artifact missing or broken = `None`, and the predictor runs on
/// its safety fallback.
pub fn load_artifacts(model_path: &str, scaler_path: &str) -> Option<ModelArtifacts> {
    let scaler = match StandardScaler::load(Path::new(scaler_path)) {
        Ok(scaler) => scaler,
        Err(e) => {
            log::warn!("Scaler unavailable ({}). Using fallback heuristics.", e);
            return None;
        }
    };

    let model = match OnnxRegressor::load(Path::new(model_path)) {
        Ok(model) => model,
        Err(e) => {
            log::warn!("Model unavailable ({}). Using fallback heuristics.", e);
            return None;
        }
    };

    Some(ModelArtifacts {
        model: Arc::new(model),
        scaler: Arc::new(scaler),
    })
}
