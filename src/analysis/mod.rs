//! Analysis and result aggregation modules
//!
//! Turns a key ranking into the final estimate:
//! - Confidence calibration and recording advice
//! - Result types
//! - Metadata

pub mod confidence;
pub mod metadata;
pub mod result;
