//! Speed Limit Advisor - Decision Fusion Core
//!
//! Recommends a road speed limit from weather predicates, a near-accident
//! model and an air-quality estimate, with rule-based fallbacks on every
//! external dependency.

pub mod constants;
pub mod logic;

pub use logic::config::EngineConfig;
pub use logic::fusion::{DecisionTrace, FinalDecision, FusionEngine};
pub use logic::weather::SensorSnapshot;
