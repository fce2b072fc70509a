//! Weather Risk Evaluator
//!
//! Pure predicates over one sensor snapshot. Thresholds are fixed constants.

use serde::{Deserialize, Serialize};

// ============================================================================
// THRESHOLDS (fixed, never derived at runtime)
// ============================================================================

/// Below this illuminance the road counts as dark
pub const DARKNESS_THRESHOLD_MILLILUX: f64 = 500.0;

/// Above this water film thickness black ice can form
pub const BLACK_ICE_WATER_THRESHOLD_UM: f64 = 1000.0;

/// Below this temperature water on the road freezes
pub const FREEZING_POINT_C: f64 = 0.0;

// ============================================================================
// TYPES
// ============================================================================

/// One set of roadside readings. Input to a single decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Ambient light (millilux)
    pub illuminance: f64,
    /// Water film on the road surface (micrometers)
    pub water_level: f64,
    /// Air temperature (°C)
    pub temperature: f64,
    /// Local hour, 0-23
    pub hour_of_day: u8,
}

impl SensorSnapshot {
    pub fn new(illuminance: f64, water_level: f64, temperature: f64, hour_of_day: u8) -> Self {
        Self { illuminance, water_level, temperature, hour_of_day }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WeatherRisk {
    pub is_dark: bool,
    pub is_black_ice: bool,
}

impl WeatherRisk {
    /// At least one hazard predicate holds
    pub fn any(&self) -> bool {
        self.is_dark || self.is_black_ice
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

pub fn evaluate(snapshot: &SensorSnapshot) -> WeatherRisk {
    WeatherRisk {
        is_dark: snapshot.illuminance < DARKNESS_THRESHOLD_MILLILUX,
        is_black_ice: snapshot.water_level > BLACK_ICE_WATER_THRESHOLD_UM
            && snapshot.temperature < FREEZING_POINT_C,
    }
}
