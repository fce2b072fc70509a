//! AQI Sources
//!
//! `SimulatedAqiSource` stands in for a live air-quality feed; any real feed
//! implements `AqiSource` with the same signature.

use std::ops::RangeInclusive;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Air Quality Index value
pub type AqiValue = u32;

pub trait AqiSource: Send + Sync {
    fn aqi_for_hour(&self, hour_of_day: u8) -> AqiValue;
}

/// Inclusive simulated bounds for an hour bucket
pub fn simulated_range(hour_of_day: u8) -> RangeInclusive<AqiValue> {
    match hour_of_day {
        6..=9 => 70..=120,   // morning rush
        16..=19 => 80..=150, // evening rush
        _ => 30..=90,
    }
}

pub struct SimulatedAqiSource {
    rng: Mutex<StdRng>,
}

impl SimulatedAqiSource {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    /// Reproducible sequence
    pub fn with_seed(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }
}

impl Default for SimulatedAqiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AqiSource for SimulatedAqiSource {
    fn aqi_for_hour(&self, hour_of_day: u8) -> AqiValue {
        self.rng.lock().gen_range(simulated_range(hour_of_day))
    }
}

/// Always the same value (replay, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedAqiSource(pub AqiValue);

impl AqiSource for FixedAqiSource {
    fn aqi_for_hour(&self, _hour_of_day: u8) -> AqiValue {
        self.0
    }
}
