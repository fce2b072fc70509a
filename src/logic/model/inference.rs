//! Inference Engine - ONNX Runtime Integration
//!
//! Load và chạy ONNX regression model.
//! Kept behind `RegressionModel` so the predictor can be tested without a
//! model file and the runtime can be swapped.

use std::path::Path;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::types::{ArtifactError, InferenceError};
use crate::logic::features::FEATURE_COUNT;

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// A trained near-accident regressor. Input is one already-scaled row.
pub trait RegressionModel: Send + Sync {
    fn predict(&self, scaled: &[f32; FEATURE_COUNT]) -> Result<f64, InferenceError>;
    fn name(&self) -> &str;
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    pub input_name: String,
    pub output_name: String,
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxRegressor {
    // Session::run needs &mut
    session: Mutex<Session>,
    metadata: ModelMetadata,
}

impl OnnxRegressor {
    pub fn load(model_path: &Path) -> Result<Self, ArtifactError> {
        log::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(ArtifactError::NotFound(model_path.display().to_string()));
        }

        let session = Session::builder()
            .map_err(|e| ArtifactError::Model(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactError::Model(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ArtifactError::Model(format!("Failed to load model: {}", e)))?;

        let input_name = session.inputs.first()
            .map(|i| i.name.clone())
            .ok_or_else(|| ArtifactError::Model("No input defined".to_string()))?;
        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactError::Model("No output defined".to_string()))?;

        log::info!("ONNX model loaded successfully (input: {}, output: {})", input_name, output_name);

        Ok(Self {
            session: Mutex::new(session),
            metadata: ModelMetadata {
                model_path: model_path.display().to_string(),
                input_name,
                output_name,
            },
        })
    }
}

impl RegressionModel for OnnxRegressor {
    fn predict(&self, scaled: &[f32; FEATURE_COUNT]) -> Result<f64, InferenceError> {
        // shape (1, features)
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), scaled.to_vec())
            .map_err(|e| InferenceError::Shape(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(e.to_string()))?;

        let output = outputs.get(&self.metadata.output_name)
            .ok_or_else(|| InferenceError::Shape("No output from model".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Shape(format!("Extract error: {}", e)))?;

        data.first()
            .map(|v| *v as f64)
            .ok_or_else(|| InferenceError::Shape("Empty output tensor".to_string()))
    }

    fn name(&self) -> &str {
        &self.metadata.model_path
    }
}
