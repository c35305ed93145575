//! Krumhansl-Schmuckler key templates
//!
//! Probe-tone ratings for the 12 scale degrees of a major and a minor key,
//! index 0 = tonic. Rotating a template to tonic `t` gives the template of
//! the key on `t`.
//!
//! # Reference
//!
//! Krumhansl, C. L., & Kessler, E. J. (1982). Tracing the Dynamic Changes in Perceived
//! Tonal Organization in a Spatial Representation of Musical Keys. *Psychological Review*,
//! 89(4), 334-368.

use crate::analysis::result::{Key, Mode};
use crate::features::chroma::profile::{PitchClassProfile, PITCH_CLASSES};

/// Major key profile
pub const MAJOR_PROFILE: [f64; PITCH_CLASSES] = [
    6.35, // Tonic
    2.23, // Minor 2nd
    3.48, // Major 2nd
    2.33, // Minor 3rd
    4.38, // Major 3rd
    4.09, // Perfect 4th
    2.52, // Tritone
    5.19, // Perfect 5th
    2.39, // Minor 6th
    3.66, // Major 6th
    2.29, // Minor 7th
    2.88, // Major 7th
];

/// Minor key profile
pub const MINOR_PROFILE: [f64; PITCH_CLASSES] = [
    6.33, // Tonic
    2.68, // Minor 2nd
    3.52, // Major 2nd
    5.38, // Minor 3rd
    2.60, // Major 3rd
    3.53, // Perfect 4th
    2.54, // Tritone
    4.75, // Perfect 5th
    3.98, // Minor 6th
    2.69, // Major 6th
    3.34, // Minor 7th
    3.17, // Major 7th
];

/// Key templates for both modes
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplates {
    /// Major profile, index 0 = tonic
    pub major: [f64; PITCH_CLASSES],

    /// Minor profile, index 0 = tonic
    pub minor: [f64; PITCH_CLASSES],
}

impl KeyTemplates {
    /// Krumhansl-Kessler templates
    pub fn new() -> Self {
        Self {
            major: MAJOR_PROFILE,
            minor: MINOR_PROFILE,
        }
    }

    /// Template for one mode
    pub fn template(&self, mode: Mode) -> &[f64; PITCH_CLASSES] {
        match mode {
            Mode::Major => &self.major,
            Mode::Minor => &self.minor,
        }
    }

    /// Largest value of either template
    ///
    /// A normalized profile can never score above this, so dividing by it
    /// maps template scores into [0, 1].
    pub fn peak(&self) -> f64 {
        self.major
            .iter()
            .chain(self.minor.iter())
            .fold(0.0f64, |acc, &v| acc.max(v))
    }

    /// Correlation of a profile with the template of `mode` rotated to `tonic`
    ///
    /// `Σ pcp[i] × template[(i - tonic) mod 12]`
    pub fn score(&self, profile: &PitchClassProfile, tonic: usize, mode: Mode) -> f64 {
        score_aligned(&profile.aligned_to(tonic), self.template(mode))
    }

    /// Winning mode and its score at one rotation (major wins ties)
    pub fn best_mode(&self, aligned: &[f64; PITCH_CLASSES]) -> (Mode, f64) {
        let major = score_aligned(aligned, &self.major);
        let minor = score_aligned(aligned, &self.minor);
        if minor > major {
            (Mode::Minor, minor)
        } else {
            (Mode::Major, major)
        }
    }

    /// Best of all 24 template matches
    ///
    /// Ties resolve to the lower tonic, then major.
    pub fn best_match(&self, profile: &PitchClassProfile) -> (Key, f64) {
        let mut best = (Key::Major(0), f64::NEG_INFINITY);
        for tonic in 0..PITCH_CLASSES {
            let (mode, score) = self.best_mode(&profile.aligned_to(tonic));
            if score > best.1 {
                best = (Key::new(tonic as u32, mode), score);
            }
        }
        best
    }
}

impl Default for KeyTemplates {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot product of a tonic-aligned profile with a template
fn score_aligned(aligned: &[f64; PITCH_CLASSES], template: &[f64; PITCH_CLASSES]) -> f64 {
    aligned.iter().zip(template.iter()).map(|(p, t)| p * t).sum()
}
