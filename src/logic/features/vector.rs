//! Feature Vector - Model input for one prediction attempt
//!
//! Uses centralized layout from `layout.rs`. A vector starts from the
//! baseline (the scaler's fitted mean) and the three live readings are
//! written over it before anything else touches it.

use serde::{Deserialize, Serialize};

use super::layout::{
    layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION, LIGHT_INDEX,
    TEMPERATURE_INDEX, WATER_INDEX,
};
use crate::logic::weather::SensorSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Baseline copy with light/temperature/water taken from the snapshot
    pub fn from_snapshot(baseline: &[f64; FEATURE_COUNT], snapshot: &SensorSnapshot) -> Self {
        let mut vector = Self::from_values(*baseline);
        vector.values[LIGHT_INDEX] = snapshot.illuminance;
        vector.values[TEMPERATURE_INDEX] = snapshot.temperature;
        vector.values[WATER_INDEX] = snapshot.water_level;
        vector
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Values as f32, the precision the ONNX model expects
    pub fn to_f32(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}
