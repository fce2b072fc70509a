//! Standard Scaler - fitted feature-scaling transform
//!
//! Exported by the training job as JSON:
//! `{ "feature_names": [...], "mean": [...], "scale": [...] }`.
//! The fitted mean doubles as the baseline feature vector.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::types::ArtifactError;
use crate::logic::features::{validate_names, FeatureVector, FEATURE_COUNT};

/// On-disk form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    /// Zero or non-finite scale entries are treated as 1 (constant column).
    pub fn new(mean: [f64; FEATURE_COUNT], scale: [f64; FEATURE_COUNT]) -> Self {
        let scale = scale.map(|s| if s.is_finite() && s != 0.0 { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn from_artifact(artifact: ScalerArtifact) -> Result<Self, ArtifactError> {
        validate_names(artifact.feature_names.as_slice())?;

        let mean = to_array(&artifact.mean, "mean")?;
        let scale = to_array(&artifact.scale, "scale")?;

        if mean.iter().any(|m| !m.is_finite()) {
            return Err(ArtifactError::Invalid("mean contains non-finite values".to_string()));
        }

        Ok(Self::new(mean, scale))
    }

    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let artifact: ScalerArtifact = serde_json::from_str(&content)?;
        let scaler = Self::from_artifact(artifact)?;

        log::info!("Scaler loaded from: {}", path.display());
        Ok(scaler)
    }

    /// Baseline feature values
    pub fn mean(&self) -> &[f64; FEATURE_COUNT] {
        &self.mean
    }

    pub fn transform(&self, vector: &FeatureVector) -> FeatureVector {
        let mut scaled = [0.0; FEATURE_COUNT];
        for (i, value) in vector.as_array().iter().enumerate() {
            scaled[i] = (value - self.mean[i]) / self.scale[i];
        }
        FeatureVector::from_values(scaled)
    }
}

fn to_array(values: &[f64], field: &str) -> Result<[f64; FEATURE_COUNT], ArtifactError> {
    values.try_into().map_err(|_| {
        ArtifactError::Invalid(format!(
            "{} has {} values, expected {}",
            field,
            values.len(),
            FEATURE_COUNT
        ))
    })
}
