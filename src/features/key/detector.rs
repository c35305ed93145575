//! Composite key ranking
//!
//! Scores every tonic rotation of a pitch-class profile with a blend of:
//! - Krumhansl-Schmuckler template correlation (secondary signal)
//! - Root salience (dominant signal)
//! - Raw energy on the candidate root
//! - Per-frame vote fraction, when a vote histogram is available
//!
//! Each rotation contributes one candidate, in whichever mode its template
//! correlation prefers. The other mode of that tonic is eliminated and
//! trails the ranking with score 0, so the head of the ranking is always a
//! set of distinct tonics.
//!
//! # Example
//!
//! ```
//! use cadence_key::features::key::detector::rank_keys;
//! use cadence_key::{CorrelatorWeights, Key, PitchClassProfile};
//!
//! let mut energy = [0.0; 12];
//! energy[0] = 1.0; // C
//! let profile = PitchClassProfile::from_raw(&energy)?;
//!
//! let ranking = rank_keys(&profile, None, &CorrelatorWeights::default());
//! assert_eq!(ranking.len(), 24);
//! assert_eq!(ranking[0].key, Key::Major(0));
//! # Ok::<(), cadence_key::AnalysisError>(())
//! ```

use super::salience::normalized_root_salience;
use super::sort_ranking;
use super::templates::KeyTemplates;
use crate::analysis::result::{Key, KeyCandidate, Mode};
use crate::config::CorrelatorWeights;
use crate::features::chroma::profile::{PitchClassProfile, PITCH_CLASSES};

/// Score breakdown for one tonic rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationScore {
    /// Candidate tonic pitch class
    pub tonic: usize,
    /// Mode preferred by template correlation
    pub mode: Mode,
    /// Winning template score over the template peak, in [0, 1]
    pub template: f64,
    /// Normalized root salience, in [0, 1]
    pub salience: f64,
    /// Profile energy on the tonic, in [0, 1]
    pub root_energy: f64,
    /// Share of frame votes relative to the most-voted tonic, in [0, 1]
    pub votes: f64,
    /// Contrast-sharpened blend of the above
    pub composite: f64,
}

/// Score a single tonic rotation
pub fn score_rotation(
    profile: &PitchClassProfile,
    tonic: usize,
    votes: Option<&[f64; PITCH_CLASSES]>,
    weights: &CorrelatorWeights,
    templates: &KeyTemplates,
) -> RotationScore {
    let aligned = profile.aligned_to(tonic);

    let (mode, template_score) = templates.best_mode(&aligned);
    let template = safe_ratio(template_score, templates.peak());
    let salience = normalized_root_salience(&aligned);
    let root_energy = aligned[0];
    let votes = votes.map_or(0.0, |v| vote_fraction(v, tonic));

    let blended = weights.template * template
        + weights.salience * salience
        + weights.root_energy * root_energy
        + weights.votes * votes;
    let composite = blended.max(0.0).powf(weights.contrast);

    RotationScore {
        tonic,
        mode,
        template,
        salience,
        root_energy,
        votes,
        composite: if composite.is_finite() { composite } else { 0.0 },
    }
}

/// Rank all 24 keys by composite score, best first
///
/// # Arguments
///
/// * `profile` - Pitch-class profile
/// * `votes` - Optional per-frame key vote histogram (index = tonic)
/// * `weights` - Composite score blend
///
/// # Returns
///
/// 24 candidates. The 12 rotation winners carry their composite score, the
/// eliminated modes carry 0. Ties resolve to the lower tonic, then major.
/// An all-zero profile yields 24 zero scores in tie-break order.
pub fn rank_keys(
    profile: &PitchClassProfile,
    votes: Option<&[f64; PITCH_CLASSES]>,
    weights: &CorrelatorWeights,
) -> Vec<KeyCandidate> {
    let templates = KeyTemplates::new();

    let mut ranking: Vec<KeyCandidate> = Vec::with_capacity(24);
    for tonic in 0..PITCH_CLASSES {
        let rotation = score_rotation(profile, tonic, votes, weights, &templates);
        for mode in [Mode::Major, Mode::Minor] {
            let score = if mode == rotation.mode {
                rotation.composite
            } else {
                0.0
            };
            ranking.push(KeyCandidate::new(Key::new(tonic as u32, mode), score));
        }
    }
    sort_ranking(&mut ranking);

    log::debug!(
        "Composite ranking (votes={}): {}",
        votes.is_some(),
        ranking
            .iter()
            .take(3)
            .map(|c| format!("{}={:.4}", c.key.name(), c.score))
            .collect::<Vec<_>>()
            .join(", ")
    );

    ranking
}

/// `votes[tonic] / max(votes)`, 0 when no votes were cast
fn vote_fraction(votes: &[f64; PITCH_CLASSES], tonic: usize) -> f64 {
    let max = votes.iter().fold(0.0f64, |acc, &v| acc.max(v));
    safe_ratio(votes[tonic], max).clamp(0.0, 1.0)
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.is_finite() && denominator > 0.0 && numerator.is_finite() {
        numerator / denominator
    } else {
        0.0
    }
}
