//! Analysis metadata structures

use crate::features::key::Correlator;
use serde::{Deserialize, Serialize};

/// Analysis metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Recording duration in seconds (0 for the profile path)
    pub duration_seconds: f64,

    /// Sample rate in Hz (None for the profile path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    /// Analysis window length in samples
    pub window_size: usize,

    /// Hop between windows in samples
    pub hop_size: usize,

    /// Number of frames in the recording
    pub frames_total: usize,

    /// Number of frames above the silence gate
    pub frames_analyzed: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: f64,

    /// Algorithm version
    pub algorithm_version: String,

    /// Which correlator ranked the keys
    pub correlator: Correlator,
}

impl AnalysisMetadata {
    /// Metadata for a ranking computed from a caller-supplied profile
    pub fn for_profile(correlator: Correlator) -> Self {
        Self {
            duration_seconds: 0.0,
            sample_rate: None,
            window_size: 0,
            hop_size: 0,
            frames_total: 0,
            frames_analyzed: 0,
            processing_time_ms: 0.0,
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            correlator,
        }
    }
}
