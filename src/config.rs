//! Configuration parameters for key estimation

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

/// Blend weights for the composite key score
///
/// Root salience dominates, template correlation is a secondary signal.
/// The defaults reproduce the reference behaviour (pure tonic → high
/// confidence in its major key).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelatorWeights {
    /// Weight of the Krumhansl-Schmuckler template correlation (default: 0.20)
    pub template: f64,

    /// Weight of the root-salience heuristic (default: 0.42)
    pub salience: f64,

    /// Weight of the raw root-bin energy (default: 0.22)
    pub root_energy: f64,

    /// Weight of the per-frame vote fraction (default: 0.16)
    /// Ignored when no vote histogram is available
    pub votes: f64,

    /// Contrast exponent applied to the blended score (default: 4.0)
    /// Values > 1.0 widen the gap between the winning tonic and its
    /// closely related competitors (dominant, relative key)
    pub contrast: f64,
}

impl Default for CorrelatorWeights {
    fn default() -> Self {
        Self {
            template: 0.20,
            salience: 0.42,
            root_energy: 0.22,
            votes: 0.16,
            contrast: 4.0,
        }
    }
}

impl CorrelatorWeights {
    /// Check that the blend weights are non-negative and the contrast is >= 1
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let blend = [
            ("weights.template", self.template),
            ("weights.salience", self.salience),
            ("weights.root_energy", self.root_energy),
            ("weights.votes", self.votes),
        ];
        for (name, value) in blend {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }

        if !(self.contrast.is_finite() && self.contrast >= 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "weights.contrast must be >= 1.0, got {}",
                self.contrast
            )));
        }
        Ok(())
    }
}

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Framing
    /// Analysis window length in seconds (default: 0.1)
    /// The resulting sample count is clamped to [min_window, max_window]
    pub window_seconds: f64,

    /// Minimum window length in samples (default: 1024)
    pub min_window: usize,

    /// Maximum window length in samples (default: 8192)
    pub max_window: usize,

    /// Frames whose windowed energy (sum of squares) falls below this
    /// value are skipped (default: 1e-6)
    pub silence_threshold: f64,

    // Spectral estimation
    /// Lowest MIDI note queried (default: 40, E2)
    pub min_midi: u8,

    /// Highest MIDI note queried (default: 88, E6)
    pub max_midi: u8,

    /// Weight of the two quarter-tone neighbours added to each note's
    /// energy (default: 0.6)
    pub detune_weight: f64,

    // Temporal weighting
    /// Length of the cadence region at the end of the recording, in
    /// seconds (default: 1.2)
    pub cadence_seconds: f64,

    /// Weight applied to frames ending inside the cadence region
    /// (default: 3.0)
    pub cadence_weight: f64,

    // Harmonic folding
    /// Share of the bin a perfect fifth above folded into each bin (default: 0.60)
    pub fold_fifth: f64,

    /// Share of the bin a major third above folded into each bin (default: 0.30)
    pub fold_major_third: f64,

    /// Share of the bin a minor third above folded into each bin (default: 0.25)
    pub fold_minor_third: f64,

    // Key ranking
    /// Record a per-frame key vote histogram and feed it to the ranking
    /// (default: true)
    pub frame_votes: bool,

    /// Composite score blend
    pub weights: CorrelatorWeights,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_seconds: 0.1,
            min_window: 1024,
            max_window: 8192,
            silence_threshold: 1e-6,
            min_midi: 40,
            max_midi: 88,
            detune_weight: 0.6,
            cadence_seconds: 1.2,
            cadence_weight: 3.0,
            fold_fifth: 0.60,
            fold_major_third: 0.30,
            fold_minor_third: 0.25,
            frame_votes: true,
            weights: CorrelatorWeights::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from JSON
    ///
    /// Missing fields take their default values, so `{"cadence_weight": 3.2}`
    /// is a complete configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_key::AnalysisConfig;
    ///
    /// let config = AnalysisConfig::from_json(r#"{"cadence_weight": 3.2}"#)?;
    /// assert_eq!(config.cadence_weight, 3.2);
    /// assert_eq!(config.min_midi, 40);
    /// # Ok::<(), cadence_key::AnalysisError>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(format!("Malformed JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all parameters are usable
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "window_seconds must be positive, got {}",
                self.window_seconds
            )));
        }
        if self.min_window < 2 || self.min_window > self.max_window {
            return Err(AnalysisError::InvalidConfig(format!(
                "Window bounds must satisfy 2 <= min_window <= max_window, got [{}, {}]",
                self.min_window, self.max_window
            )));
        }
        if self.min_midi > self.max_midi || self.max_midi > 127 {
            return Err(AnalysisError::InvalidConfig(format!(
                "MIDI range must satisfy min_midi <= max_midi <= 127, got [{}, {}]",
                self.min_midi, self.max_midi
            )));
        }

        let non_negative = [
            ("silence_threshold", self.silence_threshold),
            ("detune_weight", self.detune_weight),
            ("cadence_seconds", self.cadence_seconds),
            ("cadence_weight", self.cadence_weight),
            ("fold_fifth", self.fold_fifth),
            ("fold_major_third", self.fold_major_third),
            ("fold_minor_third", self.fold_minor_third),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{} must be finite and >= 0, got {}",
                    name, value
                )));
            }
        }

        self.weights.validate()
    }

    /// Analysis window length in samples for a given sample rate
    ///
    /// `round(sample_rate × window_seconds)` clamped to `[min_window, max_window]`.
    pub fn window_size(&self, sample_rate: u32) -> usize {
        let raw = (sample_rate as f64 * self.window_seconds).round() as usize;
        raw.clamp(self.min_window, self.max_window)
    }

    /// Hop between consecutive windows (50% overlap)
    pub fn hop_size(&self, sample_rate: u32) -> usize {
        (self.window_size(sample_rate) / 2).max(1)
    }
}
