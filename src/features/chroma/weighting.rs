//! Cadential (temporal) frame weighting
//!
//! The closing moments of a phrase usually resolve to the tonic, so frames
//! that end inside the final stretch of the recording count more.

use crate::config::AnalysisConfig;

/// Weight for frames by their end time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceWeighting {
    /// Frames ending at or after this time (seconds) are cadential
    cadence_start: f64,
    /// Weight for cadential frames
    weight: f64,
}

impl CadenceWeighting {
    /// Weighting for a recording of `duration_seconds`
    pub fn new(duration_seconds: f64, config: &AnalysisConfig) -> Self {
        Self {
            cadence_start: duration_seconds - config.cadence_seconds,
            weight: config.cadence_weight,
        }
    }

    /// Weight of a frame ending at `end_seconds`
    pub fn weight(&self, end_seconds: f64) -> f64 {
        if end_seconds >= self.cadence_start {
            self.weight
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_region_is_weighted() {
        let weighting = CadenceWeighting::new(5.0, &AnalysisConfig::default());
        assert_eq!(weighting.weight(0.1), 1.0);
        assert_eq!(weighting.weight(3.79), 1.0);
        assert_eq!(weighting.weight(3.81), 3.0);
        assert_eq!(weighting.weight(5.0), 3.0);
    }

    #[test]
    fn test_short_recording_is_all_cadence() {
        let weighting = CadenceWeighting::new(1.0, &AnalysisConfig::default());
        assert_eq!(weighting.weight(0.1), 3.0);
    }
}
