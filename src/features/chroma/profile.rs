//! Pitch-class profile (PCP)
//!
//! A 12-bin distribution of harmonic energy, index 0 = C ... 11 = B.
//! Every value of this type is non-negative and either all zero (no signal)
//! or sums to 1 within floating-point tolerance, so consumers never need to
//! re-validate it.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Number of pitch classes
pub const PITCH_CLASSES: usize = 12;

/// Normalized 12-bin pitch-class energy profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 12]")]
pub struct PitchClassProfile([f64; PITCH_CLASSES]);

impl PitchClassProfile {
    /// The "no signal" profile
    pub fn zero() -> Self {
        Self([0.0; PITCH_CLASSES])
    }

    /// Normalize raw per-pitch-class energy into a profile
    ///
    /// Negative and non-finite bins are clipped to 0. If nothing positive is
    /// left the zero profile is returned.
    pub fn from_energy(energy: [f64; PITCH_CLASSES]) -> Self {
        let clipped = energy.map(|e| if e.is_finite() && e > 0.0 { e } else { 0.0 });
        let total: f64 = clipped.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Self::zero();
        }
        Self(clipped.map(|e| e / total))
    }

    /// Validate and normalize a caller-supplied profile
    ///
    /// The values need not be normalized. Negative and non-finite entries
    /// are clipped to 0.
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the slice does not have
    /// exactly 12 elements or carries no positive energy.
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_key::PitchClassProfile;
    ///
    /// let pcp = PitchClassProfile::from_raw(&[2.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])?;
    /// assert_eq!(pcp[0], 0.5);
    /// assert!(PitchClassProfile::from_raw(&[1.0; 11]).is_err());
    /// assert!(PitchClassProfile::from_raw(&[0.0; 12]).is_err());
    /// # Ok::<(), cadence_key::AnalysisError>(())
    /// ```
    pub fn from_raw(values: &[f64]) -> Result<Self, AnalysisError> {
        let energy = to_array(values)?;
        let profile = Self::from_energy(energy);
        if profile.is_silent() {
            return Err(AnalysisError::InvalidInput(
                "Profile carries no positive energy".to_string(),
            ));
        }
        Ok(profile)
    }

    /// Profile values, index 0 = C
    pub fn as_array(&self) -> &[f64; PITCH_CLASSES] {
        &self.0
    }

    /// Total energy (1.0, or 0.0 for the zero profile)
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// True for the "no signal" profile
    pub fn is_silent(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }

    /// Transpose up by `semitones`: the energy of pitch class `i` moves to `i + semitones`
    pub fn rotate(&self, semitones: usize) -> Self {
        let mut rotated = [0.0; PITCH_CLASSES];
        for (i, &v) in self.0.iter().enumerate() {
            rotated[(i + semitones) % PITCH_CLASSES] = v;
        }
        Self(rotated)
    }

    /// View the profile relative to a tonic: index 0 of the result is the tonic's bin
    pub fn aligned_to(&self, tonic: usize) -> [f64; PITCH_CLASSES] {
        std::array::from_fn(|degree| self.0[(degree + tonic) % PITCH_CLASSES])
    }

    /// Pitch class holding the most energy (lowest index on ties), None when silent
    pub fn max_pitch_class(&self) -> Option<usize> {
        if self.is_silent() {
            return None;
        }
        let mut best = 0;
        for (i, &v) in self.0.iter().enumerate() {
            if v > self.0[best] {
                best = i;
            }
        }
        Some(best)
    }
}

impl Default for PitchClassProfile {
    fn default() -> Self {
        Self::zero()
    }
}

impl Index<usize> for PitchClassProfile {
    type Output = f64;

    fn index(&self, pitch_class: usize) -> &f64 {
        &self.0[pitch_class]
    }
}

impl TryFrom<Vec<f64>> for PitchClassProfile {
    type Error = AnalysisError;

    /// Lenient conversion used by deserialization: an all-zero profile is accepted
    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Ok(Self::from_energy(to_array(&values)?))
    }
}

impl From<PitchClassProfile> for [f64; PITCH_CLASSES] {
    fn from(profile: PitchClassProfile) -> Self {
        profile.0
    }
}

fn to_array(values: &[f64]) -> Result<[f64; PITCH_CLASSES], AnalysisError> {
    values.try_into().map_err(|_| {
        AnalysisError::InvalidInput(format!(
            "Profile must have {} elements, got {}",
            PITCH_CLASSES,
            values.len()
        ))
    })
}
