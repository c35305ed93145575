//! Pitch-class profile modules
//!
//! Extract a 12-bin pitch-class distribution from audio:
//! - Goertzel note energy
//! - Cadential frame weighting
//! - Harmonic folding and normalization
//! - The normalized profile type

pub mod extractor;
pub mod goertzel;
pub mod normalization;
pub mod profile;
pub mod weighting;

pub use extractor::{extract_profile, extract_profile_with_votes, ProfileExtraction};
pub use profile::PitchClassProfile;
