//! Air Quality Module
//!
//! - `source`: where AQI values come from (simulated or fixed)
//! - `advisor`: AQI → speed reduction, assisted with rule-table fallback

pub mod advisor;
pub mod source;

pub use advisor::{fallback_reduction, resolve_reduction, ReductionAdvisor, ReductionDecision};
pub use source::{simulated_range, AqiSource, AqiValue, FixedAqiSource, SimulatedAqiSource};
