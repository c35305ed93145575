//! Key ranking modules
//!
//! Rank the 24 key hypotheses for a pitch-class profile using:
//! - Krumhansl-Schmuckler templates
//! - Root salience
//! - Composite ranking (audio path, optional per-frame votes)
//! - Diatonic-mask ranking (lightweight profile path)

pub mod detector;
pub mod diatonic;
pub mod salience;
pub mod templates;

pub use detector::{rank_keys, score_rotation, RotationScore};
pub use diatonic::rank_keys_diatonic;
pub use salience::root_salience;
pub use templates::KeyTemplates;

use crate::analysis::result::KeyCandidate;
use crate::config::CorrelatorWeights;
use crate::features::chroma::profile::{PitchClassProfile, PITCH_CLASSES};
use serde::{Deserialize, Serialize};

/// Which ranking to run on a profile
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Correlator {
    /// Templates + root salience + root energy (+ frame votes)
    Composite,
    /// In-scale energy under a seven-note mask
    #[default]
    DiatonicMask,
}

impl Correlator {
    /// Rank all 24 keys, best first
    ///
    /// `votes` and `weights` only affect the composite ranking.
    pub fn rank(
        &self,
        profile: &PitchClassProfile,
        votes: Option<&[f64; PITCH_CLASSES]>,
        weights: &CorrelatorWeights,
    ) -> Vec<KeyCandidate> {
        match self {
            Correlator::Composite => rank_keys(profile, votes, weights),
            Correlator::DiatonicMask => rank_keys_diatonic(profile),
        }
    }
}

/// Sort candidates by score, highest first
///
/// Stable, so candidates built in `Key::all()` order keep the tie-break
/// order (lower tonic, then major) among equal scores.
pub(crate) fn sort_ranking(ranking: &mut [KeyCandidate]) {
    ranking.sort_by(|a, b| b.score.total_cmp(&a.score));
}
