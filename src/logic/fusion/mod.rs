//! Fusion Module - one decision cycle end to end
//!
//! ## Usage
//! ```ignore
//! let engine = FusionEngine::from_config(&EngineConfig::from_env());
//! let (limit, why) = engine.decide(120.0, 500.0, 8.0, 18);
//! ```

pub mod engine;
pub mod types;

#[cfg(test)]
mod tests;

pub use engine::{
    build_justification, fuse_limits, FusionEngine, BASE_SPEED_LIMIT_KMH, DEFAULT_JUSTIFICATION,
    MIN_SPEED_LIMIT_KMH,
};
pub use types::{DecisionTrace, FinalDecision};
