//! Integration tests for key estimation

use cadence_key::analysis::confidence::{base_confidence, calibrate};
use cadence_key::features::chroma::extractor::extract_profile;
use cadence_key::features::key::rank_keys;
use cadence_key::io::decoder::decode_audio;
use cadence_key::{
    estimate_key, estimate_key_from_profile, estimate_key_from_profile_with_weights,
    estimate_keys_batch, AnalysisConfig, AnalysisError,
    CalibrationHints, ConfidenceTier, Correlator, CorrelatorWeights, Key, KeyCandidate, KeyEstimate,
    KeyWorker, Mode, PitchClassProfile, SampleBuffer,
};
use std::path::PathBuf;

const PURE_C: [f64; 12] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

/// Sum of equal-amplitude sines
fn chord(freqs: &[f32], sample_rate: u32, seconds: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * seconds) as usize;
    let amp = 0.6 / freqs.len() as f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            freqs
                .iter()
                .map(|f| (2.0 * std::f32::consts::PI * f * t).sin() * amp)
                .sum()
        })
        .collect()
}

/// Deterministic white-ish noise in [-amp, amp]
fn noise(len: usize, seed: u64, amp: f32) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 40) as f32 / (1u64 << 24) as f32 * 2.0 - 1.0) * amp
        })
        .collect()
}

fn temp_wav_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cadence_key_{}_{}.wav", name, std::process::id()))
}

/// Consecutive single notes, each held for `note_seconds`
fn melody(freqs: &[f32], sample_rate: u32, note_seconds: f32) -> Vec<f32> {
    freqs
        .iter()
        .flat_map(|&f| chord(&[f], sample_rate, note_seconds))
        .collect()
}

const C_MAJOR_TRIAD: [f32; 3] = [523.25, 659.26, 783.99]; // C5 E5 G5
const A_MINOR_TRIAD: [f32; 3] = [440.0, 523.25, 659.26]; // A4 C5 E5

#[cfg(test)]
mod tests {
    use super::*;

    // Scenarios

    #[test]
    fn test_pure_c_profile_is_confident_c_major() {
        let estimate = estimate_key_from_profile(&PURE_C, None, Correlator::Composite)
            .expect("Pure C is a valid profile");

        let best = estimate.candidates[0];
        assert_eq!(best.key.tonic(), 0);
        assert_eq!(best.key.mode(), Mode::Major);
        assert!(estimate.confidence > 0.85, "confidence {}", estimate.confidence);
        assert_eq!(estimate.tier, ConfidenceTier::High);
        assert!(estimate.advice.is_none());
    }

    #[test]
    fn test_uniform_profile_is_low_confidence() {
        let uniform = [1.0 / 12.0; 12];
        for correlator in [Correlator::Composite, Correlator::DiatonicMask] {
            let estimate = estimate_key_from_profile(&uniform, None, correlator).unwrap();
            assert!(estimate.confidence < 0.4, "{:?}: {}", correlator, estimate.confidence);
            assert_eq!(estimate.tier, ConfidenceTier::Low);
            assert!(estimate.advice.is_some());
        }
    }

    #[test]
    fn test_hints_raise_confidence_but_stay_clamped() {
        let plain = estimate_key_from_profile(&PURE_C, None, Correlator::Composite).unwrap();
        let hints = CalibrationHints::new().with_length(10.0).with_snr(20.0);
        let hinted = estimate_key_from_profile(&PURE_C, Some(&hints), Correlator::Composite).unwrap();

        assert!(hinted.confidence > plain.confidence);
        assert!(hinted.confidence <= 1.0);
        assert_eq!(hinted.key(), plain.key());
    }

    #[test]
    fn test_sustained_a3_peaks_at_a() {
        let samples = chord(&[220.0], 44100, 3.0);
        let profile = extract_profile(&samples, 44100).unwrap();
        assert_eq!(profile.max_pitch_class(), Some(9));
    }

    // Properties

    #[test]
    fn test_profile_invariant_holds_for_varied_input() {
        let inputs: Vec<(Vec<f32>, u32)> = vec![
            (chord(&C_MAJOR_TRIAD, 44100, 1.0), 44100),
            (chord(&[98.0, 146.83], 16000, 2.0), 16000),
            (noise(48000, 7, 0.3), 48000),
            (noise(300, 11, 0.5), 8000),
            (vec![0.0; 22050], 22050),
            (vec![1e-6; 4000], 8000),
        ];

        for (samples, sample_rate) in inputs {
            let profile = extract_profile(&samples, sample_rate).unwrap();
            assert!(profile.as_array().iter().all(|&v| v >= 0.0 && v.is_finite()));
            let sum = profile.sum();
            assert!(
                sum == 0.0 || (sum - 1.0).abs() < 1e-9,
                "sum {} at {} Hz",
                sum,
                sample_rate
            );
        }
    }

    #[test]
    fn test_composite_ranking_is_rotation_equivariant() {
        let profile = PitchClassProfile::from_energy([
            0.19, 0.01, 0.11, 0.02, 0.16, 0.10, 0.03, 0.17, 0.02, 0.12, 0.01, 0.06,
        ]);
        let weights = CorrelatorWeights::default();
        let base = Correlator::Composite.rank(&profile, None, &weights);

        for k in 0..12 {
            let shifted = Correlator::Composite.rank(&profile.rotate(k), None, &weights);
            for (a, b) in base.iter().zip(shifted.iter()).take(3) {
                assert_eq!(b.key.tonic(), (a.key.tonic() + k as u32) % 12);
                assert_eq!(b.key.mode(), a.key.mode());
                assert!((a.score - b.score).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_diatonic_scores_are_rotation_equivariant() {
        let profile = PitchClassProfile::from_energy([
            0.19, 0.01, 0.11, 0.02, 0.16, 0.10, 0.03, 0.17, 0.02, 0.12, 0.01, 0.06,
        ]);
        let weights = CorrelatorWeights::default();
        let base = Correlator::DiatonicMask.rank(&profile, None, &weights);

        for k in 1..12 {
            let shifted = Correlator::DiatonicMask.rank(&profile.rotate(k), None, &weights);
            for candidate in &base {
                let moved = shifted
                    .iter()
                    .find(|c| c.key == candidate.key.transpose(k as u32))
                    .unwrap();
                assert!((moved.score - candidate.score).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_zero_profile_calibrates_to_zero() {
        let ranking = rank_keys(&PitchClassProfile::zero(), None, &CorrelatorWeights::default());
        let hints = CalibrationHints::new().with_length(10.0).with_snr(30.0);

        for hints in [None, Some(&hints)] {
            let calibration = calibrate(&ranking, hints);
            assert_eq!(calibration.confidence, 0.0);
            assert_eq!(calibration.tier, ConfidenceTier::Low);
            assert!(calibration.advice.is_some());
        }
    }

    #[test]
    fn test_base_confidence_monotone_in_top1() {
        let mut previous = base_confidence(&[0.3, 0.2, 0.1]);
        for step in 1..50 {
            let top1 = 0.3 + step as f64 * 0.05;
            let next = base_confidence(&[top1, 0.2, 0.1]);
            assert!(next > previous);
            previous = next;
        }
    }

    #[test]
    fn test_extreme_hints_stay_in_range() {
        let ranked: Vec<KeyCandidate> = [0.5, 0.3, 0.2]
            .iter()
            .zip(Key::all())
            .map(|(&s, k)| KeyCandidate::new(k, s))
            .collect();

        let extremes = [
            CalibrationHints::new().with_snr(-1000.0),
            CalibrationHints::new().with_snr(1000.0).with_length(10.0),
            CalibrationHints::new().with_snr(f64::NEG_INFINITY),
            CalibrationHints::new().with_length(-5.0),
            CalibrationHints::new().with_length(f64::NAN).with_snr(f64::NAN),
        ];
        for hints in extremes {
            let c = calibrate(&ranked, Some(&hints)).confidence;
            assert!((0.0..=1.0).contains(&c), "{:?} -> {}", hints, c);
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ConfidenceTier::from_confidence(0.58), ConfidenceTier::Mid);
        assert_eq!(ConfidenceTier::from_confidence(0.85), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_confidence(0.579999), ConfidenceTier::Low);
    }

    // Audio path

    #[test]
    fn test_major_triad_recording() {
        let samples = chord(&C_MAJOR_TRIAD, 44100, 4.0);
        let estimate = estimate_key(&samples, 44100, None, &AnalysisConfig::default()).unwrap();

        assert_eq!(estimate.key(), Some(Key::Major(0)));
        assert_eq!(estimate.candidates.len(), 3);
        assert_eq!(estimate.metadata.correlator, Correlator::Composite);
        assert_eq!(estimate.metadata.sample_rate, Some(44100));
        assert_eq!(estimate.metadata.frames_analyzed, estimate.metadata.frames_total);
        assert!((estimate.metadata.duration_seconds - 4.0).abs() < 1e-3);
    }

    #[test]
    fn test_minor_triad_recording() {
        let samples = chord(&A_MINOR_TRIAD, 44100, 4.0);
        let estimate = estimate_key(&samples, 44100, None, &AnalysisConfig::default()).unwrap();
        assert_eq!(estimate.key(), Some(Key::Minor(9)));
    }

    #[test]
    fn test_scale_melodies_lean_to_subdominant() {
        // The fifth fold credits every lone note to the key a fifth below,
        // so unaccompanied scales land on the subdominant at modest confidence
        let config = AnalysisConfig::default();

        let c_major = [261.63, 293.66, 329.63, 349.23, 392.0, 440.0, 493.88, 523.25];
        let estimate = estimate_key(&melody(&c_major, 22050, 0.5), 22050, None, &config).unwrap();
        assert_eq!(estimate.key(), Some(Key::Major(5)));
        assert_ne!(estimate.tier, ConfidenceTier::High);

        let a_minor = [220.0, 246.94, 261.63, 293.66, 329.63, 349.23, 392.0, 440.0];
        let estimate = estimate_key(&melody(&a_minor, 22050, 0.5), 22050, None, &config).unwrap();
        assert_eq!(estimate.key(), Some(Key::Minor(2)));
        assert_ne!(estimate.tier, ConfidenceTier::High);
        assert!(estimate.candidates.iter().any(|c| c.key == Key::Minor(9)));

        // Without the fifth fold the scale tonics win again
        let melodic = AnalysisConfig {
            fold_fifth: 0.0,
            ..AnalysisConfig::default()
        };
        let c = estimate_key(&melody(&c_major, 22050, 0.5), 22050, None, &melodic).unwrap();
        let a = estimate_key(&melody(&a_minor, 22050, 0.5), 22050, None, &melodic).unwrap();
        assert_eq!(c.key().map(|k| k.tonic()), Some(0));
        assert_eq!(a.key().map(|k| k.tonic()), Some(9));
    }

    #[test]
    fn test_candidate_confidences_are_top_three_shares() {
        let samples = chord(&C_MAJOR_TRIAD, 22050, 2.0);
        let estimate = estimate_key(&samples, 22050, None, &AnalysisConfig::default()).unwrap();

        let total: f64 = estimate.candidates.iter().map(|c| c.score).sum();
        for c in &estimate.candidates {
            assert!((c.confidence - c.score / total).abs() < 1e-12);
        }
        assert!(estimate.candidates[0].score >= estimate.candidates[1].score);
        assert!(estimate.candidates[1].score >= estimate.candidates[2].score);
    }

    #[test]
    fn test_silent_recording_is_not_an_error() {
        let estimate = estimate_key(&vec![0.0; 44100], 44100, None, &AnalysisConfig::default())
            .expect("Silence is valid input");

        assert_eq!(estimate.confidence, 0.0);
        assert_eq!(estimate.tier, ConfidenceTier::Low);
        assert!(estimate.advice.is_some());
        assert!(estimate.profile.is_silent());
        assert_eq!(estimate.metadata.frames_analyzed, 0);
    }

    #[test]
    fn test_noisy_hint_adds_noise_advice() {
        let hints = CalibrationHints::new().with_snr(3.0);
        let estimate = estimate_key(&vec![0.0; 8000], 8000, Some(&hints), &AnalysisConfig::default())
            .unwrap();
        let advice = estimate.advice.unwrap();
        assert!(advice.contains("4-12 seconds"));
        assert!(advice.contains("background noise"));
    }

    // Errors

    #[test]
    fn test_invalid_audio_input() {
        let config = AnalysisConfig::default();
        assert!(matches!(
            estimate_key(&[], 44100, None, &config),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(matches!(
            estimate_key(&[0.1; 100], 0, None, &config),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_profile_input() {
        let cases: [&[f64]; 4] = [&[1.0; 11], &[1.0; 13], &[0.0; 12], &[-1.0; 12]];
        for values in cases {
            assert!(matches!(
                estimate_key_from_profile(values, None, Correlator::DiatonicMask),
                Err(AnalysisError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = AnalysisConfig {
            max_midi: 30,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            estimate_key(&[0.1; 4410], 44100, None, &config),
            Err(AnalysisError::InvalidConfig(_))
        ));
        assert!(AnalysisConfig::from_json("{\"cadence_weight\": -1.0}").is_err());
    }

    #[test]
    fn test_profile_path_honours_custom_weights() {
        let tuned = CorrelatorWeights {
            contrast: 1.0,
            ..CorrelatorWeights::default()
        };
        let default = estimate_key_from_profile(&PURE_C, None, Correlator::Composite).unwrap();
        let linear =
            estimate_key_from_profile_with_weights(&PURE_C, None, Correlator::Composite, &tuned)
                .unwrap();

        assert_eq!(linear.key(), default.key());
        assert!(linear.confidence < default.confidence);

        let bad = CorrelatorWeights {
            contrast: 0.5,
            ..CorrelatorWeights::default()
        };
        assert!(matches!(
            estimate_key_from_profile_with_weights(&PURE_C, None, Correlator::Composite, &bad),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_profile_path_normalizes_and_reports_metadata() {
        let raw = [6.0, 0.0, 2.0, 0.0, 3.0, 2.0, 0.0, 4.0, 0.0, 2.0, 0.0, 1.0];
        let estimate = estimate_key_from_profile(&raw, None, Correlator::DiatonicMask).unwrap();

        assert!((estimate.profile.sum() - 1.0).abs() < 1e-12);
        assert_eq!(estimate.profile[0], 0.3);
        assert_eq!(estimate.metadata.correlator, Correlator::DiatonicMask);
        assert_eq!(estimate.metadata.sample_rate, None);
        assert_eq!(estimate.metadata.frames_total, 0);
        assert_eq!(estimate.key(), Some(Key::Major(0)));
    }

    // Decoding

    #[test]
    fn test_decode_stereo_wav_and_estimate() {
        let path = temp_wav_path("stereo_c_major");
        let samples = chord(&C_MAJOR_TRIAD, 22050, 3.0);

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for &s in &samples {
            let v = (s * i16::MAX as f32) as i16;
            writer.write_sample(v).unwrap();
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let buffer = decode_audio(&path);
        std::fs::remove_file(&path).ok();
        let buffer = buffer.expect("WAV should decode");

        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.len(), samples.len());

        let estimate = estimate_key(
            buffer.samples(),
            buffer.sample_rate(),
            None,
            &AnalysisConfig::default(),
        )
        .unwrap();
        assert_eq!(estimate.key(), Some(Key::Major(0)));
    }

    // Concurrency

    #[test]
    fn test_batch_preserves_order() {
        let buffers = vec![
            SampleBuffer::new(chord(&A_MINOR_TRIAD, 22050, 2.0), 22050).unwrap(),
            SampleBuffer::new(vec![0.0; 8000], 8000).unwrap(),
            SampleBuffer::new(chord(&C_MAJOR_TRIAD, 22050, 2.0), 22050).unwrap(),
        ];
        let results = estimate_keys_batch(&buffers, None, &AnalysisConfig::default());

        assert_eq!(results.len(), 3);
        let sequential: Vec<KeyEstimate> = buffers
            .iter()
            .map(|b| estimate_key(b.samples(), b.sample_rate(), None, &AnalysisConfig::default()).unwrap())
            .collect();
        for (batch, single) in results.iter().zip(sequential.iter()) {
            let batch = batch.as_ref().unwrap();
            assert_eq!(batch.key(), single.key());
            assert_eq!(batch.confidence, single.confidence);
        }
        assert_eq!(results[1].as_ref().unwrap().confidence, 0.0);
    }

    #[test]
    fn test_worker_roundtrip() {
        let worker = KeyWorker::spawn(AnalysisConfig::default()).unwrap();
        let buffer = SampleBuffer::new(chord(&C_MAJOR_TRIAD, 22050, 2.0), 22050).unwrap();
        let hints = CalibrationHints::new().with_length(buffer.duration_seconds());

        let estimate = worker.submit(buffer, Some(hints)).unwrap().wait().unwrap();
        assert_eq!(estimate.key(), Some(Key::Major(0)));
    }

    // Serialization

    #[test]
    fn test_estimate_json_roundtrip() {
        let estimate = estimate_key_from_profile(&PURE_C, None, Correlator::Composite).unwrap();
        let json = estimate.to_json().unwrap();

        assert!(json.contains("\"tier\":\"high\""));
        assert!(json.contains("\"correlator\":\"composite\""));
        assert!(!json.contains("advice"));

        let back: KeyEstimate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key(), estimate.key());
        assert_eq!(back.profile, estimate.profile);
    }
}
