//! Harmonic folding and profile normalization

use super::profile::{PitchClassProfile, PITCH_CLASSES};
use crate::config::AnalysisConfig;

/// Shares of neighbouring bins folded into each pitch class
///
/// Each bin receives a share of the bin a perfect fifth, a major third and a
/// minor third above it, so the 5th and 3rd of a sounding chord vote for
/// its root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicFold {
    /// Share of the bin 7 semitones above
    pub fifth: f64,
    /// Share of the bin 4 semitones above
    pub major_third: f64,
    /// Share of the bin 3 semitones above
    pub minor_third: f64,
}

impl HarmonicFold {
    /// Fold shares from an analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            fifth: config.fold_fifth,
            major_third: config.fold_major_third,
            minor_third: config.fold_minor_third,
        }
    }

    /// Apply one folding pass (mod-12 wraparound)
    ///
    /// Reads from the unfolded input only, so the result does not depend on
    /// bin order.
    pub fn apply(&self, energy: &[f64; PITCH_CLASSES]) -> [f64; PITCH_CLASSES] {
        std::array::from_fn(|i| {
            energy[i]
                + self.fifth * energy[(i + 7) % PITCH_CLASSES]
                + self.major_third * energy[(i + 4) % PITCH_CLASSES]
                + self.minor_third * energy[(i + 3) % PITCH_CLASSES]
        })
    }
}

impl Default for HarmonicFold {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Fold then normalize raw pitch-class energy into a profile
///
/// Zero total energy gives the zero profile.
pub fn fold_and_normalize(energy: &[f64; PITCH_CLASSES], fold: &HarmonicFold) -> PitchClassProfile {
    PitchClassProfile::from_energy(fold.apply(energy))
}
