//! Root salience
//!
//! Template correlation alone often confuses a key with its relative or
//! dominant key, since they share nearly the same note collection. Root
//! salience breaks that symmetry by rewarding energy on the degrees that
//! imply a specific tonic (root, fifth, thirds) and penalizing energy on
//! degrees that contradict it (minor 2nd, tritone, ...).

use crate::features::chroma::profile::PITCH_CLASSES;

/// Weight of the root degree, the largest salience weight
pub const ROOT_WEIGHT: f64 = 4.20;

/// Salience weight per scale degree, index 0 = candidate tonic
pub const DEGREE_WEIGHTS: [f64; PITCH_CLASSES] = [
    ROOT_WEIGHT, // Root
    -0.70,       // Minor 2nd
    -0.20,       // Major 2nd
    0.65,        // Minor 3rd
    0.70,        // Major 3rd
    0.0,         // Perfect 4th
    -0.55,       // Tritone
    2.15,        // Perfect 5th
    0.45,        // Minor 6th (minor-key support)
    -0.28,       // Major 6th (root of the relative minor)
    0.20,        // Minor 7th (minor-key support)
    -0.15,       // Major 7th
];

/// Root salience of a tonic-aligned profile (index 0 = candidate tonic)
///
/// Unbounded below; at most [`ROOT_WEIGHT`] for a normalized profile.
pub fn root_salience(aligned: &[f64; PITCH_CLASSES]) -> f64 {
    aligned
        .iter()
        .zip(DEGREE_WEIGHTS.iter())
        .map(|(energy, weight)| energy * weight)
        .sum()
}

/// Root salience scaled into [0, 1] (negative salience counts as none)
pub fn normalized_root_salience(aligned: &[f64; PITCH_CLASSES]) -> f64 {
    (root_salience(aligned) / ROOT_WEIGHT).clamp(0.0, 1.0)
}
