//! Pitch-class profile extraction
//!
//! Converts a mono recording into a normalized 12-bin profile.
//!
//! Algorithm:
//! 1. Frame the audio (≈100 ms Hann windows, 50% overlap)
//! 2. Skip frames whose windowed energy is below the silence gate
//! 3. For every note of the analysis range (MIDI 40-88 by default) below
//!    Nyquist, measure the energy at the exact note frequency with a Goertzel
//!    resonator and add 0.6× the energy of its two quarter-tone neighbours
//! 4. Fold note energy into its pitch class and accumulate, weighting frames
//!    that end in the final 1.2 s (cadence) by 3×
//! 5. Fold each bin with the bins a fifth, major third and minor third above
//! 6. Normalize to unit sum (all zeros for pure silence)
//!
//! The vote variant additionally ranks every non-silent frame on its own and
//! keeps a histogram of the winning tonics.
//!
//! # Example
//!
//! ```
//! use cadence_key::features::chroma::extractor::extract_profile;
//!
//! let sample_rate = 44100;
//! let samples: Vec<f32> = (0..sample_rate * 2)
//!     .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / sample_rate as f32).sin() * 0.5)
//!     .collect();
//!
//! let profile = extract_profile(&samples, sample_rate as u32)?;
//! assert_eq!(profile.max_pitch_class(), Some(9)); // A
//! # Ok::<(), cadence_key::AnalysisError>(())
//! ```

use super::goertzel::{midi_to_freq, Goertzel};
use super::normalization::{fold_and_normalize, HarmonicFold};
use super::profile::{PitchClassProfile, PITCH_CLASSES};
use super::weighting::CadenceWeighting;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::key::templates::KeyTemplates;
use crate::io::sample_buffer::{validate, Frames};
use crate::preprocessing::silence::SilenceGate;
use std::f64::consts::PI;

/// Recordings longer than this get a warning; analysis cost is linear in length
const LONG_RECORDING_SECONDS: f64 = 60.0;

/// Profile plus the frame statistics gathered while extracting it
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileExtraction {
    /// Global pitch-class profile
    pub profile: PitchClassProfile,

    /// Per-frame key votes (index = winning tonic), cadence-weighted
    /// None when vote recording is disabled
    pub votes: Option<[f64; PITCH_CLASSES]>,

    /// Window length in samples
    pub window_size: usize,

    /// Hop in samples
    pub hop_size: usize,

    /// Number of frames in the recording
    pub frames_total: usize,

    /// Number of frames that passed the silence gate
    pub frames_analyzed: usize,
}

/// Extract a pitch-class profile with the default configuration
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty samples or a zero sample rate.
pub fn extract_profile(samples: &[f32], sample_rate: u32) -> Result<PitchClassProfile, AnalysisError> {
    let config = AnalysisConfig {
        frame_votes: false,
        ..AnalysisConfig::default()
    };
    Ok(extract_profile_with_votes(samples, sample_rate, &config)?.profile)
}

/// Extract a pitch-class profile and, if `config.frame_votes`, a per-frame vote histogram
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` for empty samples or a zero sample
/// rate, and `AnalysisError::InvalidConfig` for an unusable configuration.
pub fn extract_profile_with_votes(
    samples: &[f32],
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Result<ProfileExtraction, AnalysisError> {
    validate(samples, sample_rate)?;
    config.validate()?;

    let window_size = config.window_size(sample_rate);
    let hop_size = config.hop_size(sample_rate);
    let duration = samples.len() as f64 / sample_rate as f64;

    if samples.len() < window_size {
        log::warn!(
            "Recording ({} samples) shorter than one analysis window ({}), result will be unreliable",
            samples.len(),
            window_size
        );
    }
    if duration > LONG_RECORDING_SECONDS {
        log::warn!(
            "Recording is {:.1}s long; key estimation assumes a few seconds and may be slow",
            duration
        );
    }

    log::debug!(
        "Extracting profile: {} samples at {} Hz, window={}, hop={}",
        samples.len(),
        sample_rate,
        window_size,
        hop_size
    );

    let bank = NoteBank::new(sample_rate, config);
    let window = hann_window(window_size);
    let gate = SilenceGate::from_config(config);
    let cadence = CadenceWeighting::new(duration, config);
    let fold = HarmonicFold::from_config(config);
    let templates = KeyTemplates::new();

    let mut accumulator = [0.0f64; PITCH_CLASSES];
    let mut votes = [0.0f64; PITCH_CLASSES];
    let mut frame = vec![0.0f64; window_size];
    let frames_total = Frames::count_total(samples.len(), window_size, hop_size);
    let mut frames_analyzed = 0;

    for chunk in Frames::new(samples, window_size, hop_size) {
        // Window the chunk; a short final chunk is zero-padded
        for (i, (dst, w)) in frame.iter_mut().zip(window.iter()).enumerate() {
            *dst = chunk.samples.get(i).map_or(0.0, |&s| s as f64 * w);
        }

        if gate.is_silent(&frame) {
            continue;
        }
        frames_analyzed += 1;

        let frame_energy = bank.pitch_class_energy(&frame);
        let weight = cadence.weight(chunk.end() as f64 / sample_rate as f64);
        for (acc, e) in accumulator.iter_mut().zip(frame_energy.iter()) {
            *acc += weight * e;
        }

        if config.frame_votes {
            let local = fold_and_normalize(&frame_energy, &fold);
            if !local.is_silent() {
                let (key, _) = templates.best_match(&local);
                votes[key.tonic() as usize] += weight;
            }
        }
    }

    let profile = fold_and_normalize(&accumulator, &fold);

    log::debug!(
        "Profile extracted: {}/{} frames analyzed, strongest pitch class {:?}",
        frames_analyzed,
        frames_total,
        profile.max_pitch_class()
    );

    Ok(ProfileExtraction {
        profile,
        votes: config.frame_votes.then_some(votes),
        window_size,
        hop_size,
        frames_total,
        frames_analyzed,
    })
}

/// Periodic Hann window
fn hann_window(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / len as f64).cos()))
        .collect()
}

/// Resonators for one analysed note
#[derive(Debug, Clone)]
struct NoteFilters {
    pitch_class: usize,
    exact: Goertzel,
    /// Quarter-tone neighbours below Nyquist
    neighbours: Vec<Goertzel>,
}

/// Precomputed resonators for every analysed note
#[derive(Debug, Clone)]
struct NoteBank {
    notes: Vec<NoteFilters>,
    detune_weight: f64,
}

impl NoteBank {
    fn new(sample_rate: u32, config: &AnalysisConfig) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        let notes = (config.min_midi..=config.max_midi)
            .filter(|&midi| midi_to_freq(midi as f64) < nyquist)
            .map(|midi| {
                let midi = midi as f64;
                let neighbours = [midi - 0.5, midi + 0.5]
                    .iter()
                    .map(|&m| midi_to_freq(m))
                    .filter(|&f| f < nyquist)
                    .map(|f| Goertzel::new(f, sample_rate))
                    .collect();
                NoteFilters {
                    pitch_class: midi as usize % PITCH_CLASSES,
                    exact: Goertzel::new(midi_to_freq(midi), sample_rate),
                    neighbours,
                }
            })
            .collect::<Vec<_>>();

        if notes.is_empty() {
            log::warn!(
                "No analysed note lies below Nyquist at {} Hz; profile will be empty",
                sample_rate
            );
        }

        Self {
            notes,
            detune_weight: config.detune_weight,
        }
    }

    /// Detune-widened note energy folded into pitch classes
    fn pitch_class_energy(&self, frame: &[f64]) -> [f64; PITCH_CLASSES] {
        let mut energy = [0.0f64; PITCH_CLASSES];
        for note in &self.notes {
            let neighbours: f64 = note.neighbours.iter().map(|g| g.power(frame)).sum();
            energy[note.pitch_class] += note.exact.power(frame) + self.detune_weight * neighbours;
        }
        energy
    }
}
