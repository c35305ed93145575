//! Diatonic-mask key ranking
//!
//! A cheap approximation for callers that only have a pitch-class profile
//! (for example one summarized client-side and sent to a server): each key
//! scores the profile energy that falls inside its seven-note scale. No
//! template correlation, no root salience, so relative keys (C major / A
//! minor) tie and resolve by tonic order.

use super::sort_ranking;
use crate::analysis::result::{Key, KeyCandidate, Mode};
use crate::features::chroma::profile::PitchClassProfile;

/// Major scale steps above the tonic
pub const MAJOR_SCALE_STEPS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Natural minor scale steps above the tonic
pub const MINOR_SCALE_STEPS: [usize; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Energy of `profile` inside the scale of `key`
pub fn scale_energy(profile: &PitchClassProfile, key: Key) -> f64 {
    let steps = match key.mode() {
        Mode::Major => &MAJOR_SCALE_STEPS,
        Mode::Minor => &MINOR_SCALE_STEPS,
    };
    let tonic = key.tonic() as usize;
    steps.iter().map(|&s| profile[(tonic + s) % 12]).sum()
}

/// Rank all 24 keys by in-scale energy, best first
///
/// Ties resolve to the lower tonic, then major.
pub fn rank_keys_diatonic(profile: &PitchClassProfile) -> Vec<KeyCandidate> {
    let mut ranking: Vec<KeyCandidate> = Key::all()
        .into_iter()
        .map(|key| KeyCandidate::new(key, scale_energy(profile, key)))
        .collect();
    sort_ranking(&mut ranking);

    log::debug!(
        "Diatonic ranking: best={} ({:.4})",
        ranking[0].key.name(),
        ranking[0].score
    );
    ranking
}
