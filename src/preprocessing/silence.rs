//! Per-frame silence gating

use crate::config::AnalysisConfig;

/// Energy gate for analysis frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilenceGate {
    /// Frames with energy (sum of squares) below this are silent (default: 1e-6)
    pub threshold: f64,
}

impl Default for SilenceGate {
    fn default() -> Self {
        Self { threshold: 1e-6 }
    }
}

impl SilenceGate {
    /// Gate using the configured threshold
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            threshold: config.silence_threshold,
        }
    }

    /// True if the (windowed) frame should be skipped
    pub fn is_silent(&self, frame: &[f64]) -> bool {
        frame_energy(frame) < self.threshold
    }
}

/// Sum of squares of a frame
pub fn frame_energy(frame: &[f64]) -> f64 {
    frame.iter().map(|&x| x * x).sum()
}
