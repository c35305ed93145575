//! # Cadence Key
//!
//! Musical key estimation for short recordings (a sung or played phrase of
//! a few seconds): pitch-class profiling, key ranking and calibrated
//! confidence with re-recording advice.
//!
//! ## Features
//!
//! - **Profile extraction**: Goertzel note energy over Hann-windowed frames,
//!   with cadence weighting and harmonic folding
//! - **Key ranking**: composite score (templates + root salience + frame votes)
//!   or a lightweight diatonic mask
//! - **Calibration**: confidence tiers plus advice for uncertain takes
//! - **Off-thread execution**: a background worker and a parallel batch API
//!
//! ## Quick Start
//!
//! ```no_run
//! use cadence_key::{estimate_key, AnalysisConfig, CalibrationHints};
//!
//! // Load audio samples (mono, f32, normalized)
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 44100;
//!
//! let hints = CalibrationHints::new().with_length(8.0);
//! let estimate = estimate_key(&samples, sample_rate, Some(&hints), &AnalysisConfig::default())?;
//!
//! if let Some(key) = estimate.key() {
//!     println!("Key: {} (confidence: {:.2}, {})", key, estimate.confidence, estimate.tier.as_str());
//! }
//! # Ok::<(), cadence_key::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio Input → Profile Extraction → Key Ranking → Calibration → Output
//! 12 floats   ───────────────────────↗
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod worker;

// Re-export main types
pub use analysis::confidence::{Calibration, CalibrationHints, ConfidenceTier};
pub use analysis::metadata::AnalysisMetadata;
pub use analysis::result::{Key, KeyCandidate, KeyEstimate, Mode};
pub use config::{AnalysisConfig, CorrelatorWeights};
pub use error::AnalysisError;
pub use features::chroma::profile::PitchClassProfile;
pub use features::key::Correlator;
pub use io::sample_buffer::SampleBuffer;
pub use worker::{KeyWorker, PendingEstimate};

use analysis::confidence::calibrate;
use features::chroma::extractor::extract_profile_with_votes;
use rayon::prelude::*;
use std::time::Instant;

/// Estimate the key of a mono recording
///
/// Extracts a pitch-class profile (with per-frame votes when enabled), ranks
/// all 24 keys with the composite correlator and calibrates the result.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `hints` - Optional recording length / SNR used by calibration
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `KeyEstimate` with the top three candidates, confidence, tier and advice.
/// A silent recording is not an error: it yields confidence 0 and advice.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty samples or a zero sample
/// rate, and `AnalysisError::InvalidConfig` for an unusable configuration.
///
/// # Example
///
/// ```
/// use cadence_key::{estimate_key, AnalysisConfig, ConfidenceTier};
///
/// let silence = vec![0.0f32; 44100];
/// let estimate = estimate_key(&silence, 44100, None, &AnalysisConfig::default())?;
/// assert_eq!(estimate.confidence, 0.0);
/// assert_eq!(estimate.tier, ConfidenceTier::Low);
/// assert!(estimate.advice.is_some());
/// # Ok::<(), cadence_key::AnalysisError>(())
/// ```
pub fn estimate_key(
    samples: &[f32],
    sample_rate: u32,
    hints: Option<&CalibrationHints>,
    config: &AnalysisConfig,
) -> Result<KeyEstimate, AnalysisError> {
    let start_time = Instant::now();

    log::debug!(
        "Starting key estimation: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    let extraction = extract_profile_with_votes(samples, sample_rate, config)?;

    if extraction.frames_analyzed == 0 {
        log::warn!("Recording is entirely silent, no key can be estimated");
    }

    let correlator = Correlator::Composite;
    let ranking = correlator.rank(
        &extraction.profile,
        extraction.votes.as_ref(),
        &config.weights,
    );

    let metadata = AnalysisMetadata {
        duration_seconds: samples.len() as f64 / sample_rate as f64,
        sample_rate: Some(sample_rate),
        window_size: extraction.window_size,
        hop_size: extraction.hop_size,
        frames_total: extraction.frames_total,
        frames_analyzed: extraction.frames_analyzed,
        processing_time_ms: 0.0,
        algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
        correlator,
    };

    let mut estimate = build_estimate(extraction.profile, &ranking, hints, metadata);
    estimate.metadata.processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    log::debug!(
        "Key estimation complete: {:?} (confidence {:.3}, {}) in {:.2} ms",
        estimate.key().map(|k| k.name()),
        estimate.confidence,
        estimate.tier.as_str(),
        estimate.metadata.processing_time_ms
    );

    Ok(estimate)
}

/// Estimate the key from a caller-supplied 12-bin pitch-class profile
///
/// The profile need not be normalized. No audio is involved, so frame
/// votes are unavailable and the metadata frame counts are zero.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the profile does not have
/// exactly 12 values or carries no positive energy.
///
/// # Example
///
/// ```
/// use cadence_key::{estimate_key_from_profile, Correlator, Key};
///
/// // C major scale, tonic emphasized
/// let profile = [3.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
/// let estimate = estimate_key_from_profile(&profile, None, Correlator::Composite)?;
/// assert_eq!(estimate.key(), Some(Key::Major(0)));
/// # Ok::<(), cadence_key::AnalysisError>(())
/// ```
pub fn estimate_key_from_profile(
    values: &[f64],
    hints: Option<&CalibrationHints>,
    correlator: Correlator,
) -> Result<KeyEstimate, AnalysisError> {
    estimate_key_from_profile_with_weights(values, hints, correlator, &CorrelatorWeights::default())
}

/// [`estimate_key_from_profile`] with caller-tuned composite weights
///
/// `weights` only affect [`Correlator::Composite`].
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for a malformed profile and
/// `AnalysisError::InvalidConfig` for unusable weights.
pub fn estimate_key_from_profile_with_weights(
    values: &[f64],
    hints: Option<&CalibrationHints>,
    correlator: Correlator,
    weights: &CorrelatorWeights,
) -> Result<KeyEstimate, AnalysisError> {
    let start_time = Instant::now();
    weights.validate()?;
    let profile = PitchClassProfile::from_raw(values)?;

    let ranking = correlator.rank(&profile, None, weights);

    let mut estimate = build_estimate(profile, &ranking, hints, AnalysisMetadata::for_profile(correlator));
    estimate.metadata.processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
    Ok(estimate)
}

/// Estimate the keys of independent recordings in parallel
///
/// Results are returned in input order; one failing buffer does not affect
/// the others.
pub fn estimate_keys_batch(
    buffers: &[SampleBuffer],
    hints: Option<&CalibrationHints>,
    config: &AnalysisConfig,
) -> Vec<Result<KeyEstimate, AnalysisError>> {
    log::debug!("Estimating keys for {} recordings", buffers.len());

    buffers
        .par_iter()
        .map(|buffer| estimate_key(buffer.samples(), buffer.sample_rate(), hints, config))
        .collect()
}

fn build_estimate(
    profile: PitchClassProfile,
    ranking: &[KeyCandidate],
    hints: Option<&CalibrationHints>,
    metadata: AnalysisMetadata,
) -> KeyEstimate {
    let Calibration {
        confidence,
        tier,
        candidates,
        advice,
    } = calibrate(ranking, hints);

    KeyEstimate {
        candidates,
        confidence,
        tier,
        profile,
        advice,
        metadata,
    }
}
