//! Feature extraction modules
//!
//! - Pitch-class profile extraction
//! - Key ranking
pub mod chroma;
pub mod key;
