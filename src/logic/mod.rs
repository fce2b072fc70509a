//! Logic Module - Business Logic & Engines
//!
//! ## Layout
//! - `weather` - Sensor snapshot and hazard predicates
//! - `features/` - Model input layout and vectors
//! - `model/` - Near-accident prediction (ONNX + fallback)
//! - `assisted/` - External reasoning service client
//! - `router` - Gate for the predictor
//! - `air_quality/` - AQI sources and reduction advisor
//! - `fusion/` - One decision cycle end to end

pub mod air_quality;
pub mod assisted;
pub mod config;
pub mod features;
pub mod fusion;
pub mod model;
pub mod router;
pub mod weather;

#[cfg(test)]
pub(crate) mod testing;
