//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema shared with the
//! training job.** The scaler artifact names its columns; they must match
//! `FEATURE_LAYOUT` exactly, in order.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: &[&str] = &[
    "humidity",       // 0
    "light",          // 1: overwritten with illuminance (millilux)
    "noise",          // 2
    "temperature",    // 3: overwritten with temperature (°C)
    "traffic",        // 4
    "wind_direction", // 5
    "wind_strength",  // 6
    "water",          // 7: overwritten with water level (µm)
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 8;

pub const LIGHT_INDEX: usize = 1;
pub const TEMPERATURE_INDEX: usize = 3;
pub const WATER_INDEX: usize = 7;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 of version + feature names, used to detect layout mismatches
pub fn compute_layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

fn hash_names<'a>(version: u8, names: impl Iterator<Item = &'a str>) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash()
}

/// Normalize a column name from the training table ("wind direction",
/// "Wind-Strength") to the layout spelling.
pub fn canonical_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

#[derive(Debug, Clone, thiserror::Error)]
#[error("Feature layout mismatch: expected {expected:?} (hash: {expected_hash:08x}), got {actual:?} (hash: {actual_hash:08x})")]
pub struct LayoutMismatchError {
    pub expected: Vec<String>,
    pub expected_hash: u32,
    pub actual: Vec<String>,
    pub actual_hash: u32,
}

/// Validate column names coming from an artifact against the current layout
pub fn validate_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    let canonical: Vec<String> = names.iter().map(|n| canonical_name(n.as_ref())).collect();
    let actual_hash = hash_names(FEATURE_VERSION, canonical.iter().map(String::as_str));
    let expected_hash = layout_hash();

    if actual_hash != expected_hash {
        return Err(LayoutMismatchError {
            expected: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            expected_hash,
            actual: canonical,
            actual_hash,
        });
    }

    Ok(())
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
