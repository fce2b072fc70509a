//! Features Module - Model input construction
//!
//! `layout` owns the schema shared with the training job,
//! `vector` builds one input row per prediction attempt.

pub mod layout;
pub mod vector;


pub use layout::{
    feature_index, feature_name, layout_hash, validate_names, LayoutMismatchError,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use vector::FeatureVector;
