//! Confidence calibration and recording advice
//!
//! Turns the raw scores of a key ranking into a probability-like confidence
//! for the best candidate, buckets it into a tier and, for the low tier,
//! tells the user how to record a better take.
//!
//! # Algorithm
//!
//! 1. **Base confidence**: `top1 / (top1 + top2 + top3)` over the three best
//!    scores, 0 when that sum is not a positive finite number
//! 2. **Length bonus**: +0.03 when the recording is 6-14 seconds long
//! 3. **SNR adjustment**: +0.03 above 18 dB, -0.08 below 8 dB
//! 4. **Clamp** to [0, 1] and classify: low < 0.58 <= mid < 0.85 <= high
//!
//! Both the audio pipeline and the profile path go through [`calibrate`].
//!
//! # Example
//!
//! ```
//! use cadence_key::analysis::confidence::{calibrate, CalibrationHints, ConfidenceTier};
//! use cadence_key::{Key, KeyCandidate};
//!
//! let ranked = vec![
//!     KeyCandidate::new(Key::Major(0), 0.9),
//!     KeyCandidate::new(Key::Major(7), 0.05),
//!     KeyCandidate::new(Key::Minor(9), 0.05),
//! ];
//! let calibration = calibrate(&ranked, Some(&CalibrationHints::new().with_length(10.0)));
//!
//! assert_eq!(calibration.tier, ConfidenceTier::High);
//! assert!(calibration.advice.is_none());
//! ```

use super::result::KeyCandidate;
use serde::{Deserialize, Serialize};

/// Confidence below this is the low tier
pub const MID_TIER_THRESHOLD: f64 = 0.58;

/// Confidence at or above this is the high tier
pub const HIGH_TIER_THRESHOLD: f64 = 0.85;

/// Number of top candidates that take part in calibration
pub const CALIBRATION_DEPTH: usize = 3;

const LENGTH_BONUS: f64 = 0.03;
const LENGTH_BONUS_RANGE_SEC: (f64, f64) = (6.0, 14.0);

const SNR_BONUS: f64 = 0.03;
const SNR_BONUS_ABOVE_DB: f64 = 18.0;
const SNR_PENALTY: f64 = 0.08;
const SNR_PENALTY_BELOW_DB: f64 = 8.0;

const ADVICE_RERECORD: &str =
    "Key is uncertain. Re-record 4-12 seconds in a quieter environment, letting the final chord or note ring out.";
const ADVICE_NOISE: &str =
    "The recording is noisy: reduce background noise or move the microphone closer to the source.";

/// Caller-supplied side information about the recording
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationHints {
    /// Recording length in seconds
    pub length_sec: Option<f64>,

    /// Estimated signal-to-noise ratio in dB
    pub snr_db: Option<f64>,
}

impl CalibrationHints {
    /// No hints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recording length in seconds
    pub fn with_length(mut self, seconds: f64) -> Self {
        self.length_sec = Some(seconds);
        self
    }

    /// Set the signal-to-noise estimate in dB
    pub fn with_snr(mut self, db: f64) -> Self {
        self.snr_db = Some(db);
        self
    }

    fn is_noisy(&self) -> bool {
        self.snr_db.is_some_and(|snr| snr < SNR_PENALTY_BELOW_DB)
    }
}

/// Confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// confidence < 0.58
    Low,
    /// 0.58 <= confidence < 0.85
    Mid,
    /// confidence >= 0.85
    High,
}

impl ConfidenceTier {
    /// Classify a calibrated confidence
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_key::ConfidenceTier;
    ///
    /// assert_eq!(ConfidenceTier::from_confidence(0.579999), ConfidenceTier::Low);
    /// assert_eq!(ConfidenceTier::from_confidence(0.58), ConfidenceTier::Mid);
    /// assert_eq!(ConfidenceTier::from_confidence(0.85), ConfidenceTier::High);
    /// ```
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_TIER_THRESHOLD {
            ConfidenceTier::High
        } else if confidence >= MID_TIER_THRESHOLD {
            ConfidenceTier::Mid
        } else {
            // NaN lands here too
            ConfidenceTier::Low
        }
    }

    /// Lowercase tier label
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Mid => "mid",
            ConfidenceTier::High => "high",
        }
    }
}

/// Result of calibrating a ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Calibrated confidence of the best candidate (0.0-1.0)
    pub confidence: f64,

    /// Tier of `confidence`
    pub tier: ConfidenceTier,

    /// The top candidates, each with its share of the top-three score mass
    pub candidates: Vec<KeyCandidate>,

    /// Recording advice, only for the low tier
    pub advice: Option<String>,
}

/// Base confidence from the best scores: `top1 / (top1 + top2 + top3)`
///
/// Only the first three scores are used. Returns 0 when the denominator is
/// not a positive finite number (silent profile, NaN scores).
pub fn base_confidence(top_scores: &[f64]) -> f64 {
    let top = &top_scores[..top_scores.len().min(CALIBRATION_DEPTH)];
    let Some(&best) = top.first() else {
        return 0.0;
    };
    safe_share(best, top.iter().sum())
}

/// Calibrate a ranking (best first) into a confidence, tier and advice
pub fn calibrate(ranked: &[KeyCandidate], hints: Option<&CalibrationHints>) -> Calibration {
    let top = &ranked[..ranked.len().min(CALIBRATION_DEPTH)];
    let scores: Vec<f64> = top.iter().map(|c| c.score).collect();
    let total: f64 = scores.iter().sum();

    let base = base_confidence(&scores);
    let confidence = if base > 0.0 {
        adjust(base, hints)
    } else {
        // No information: hints cannot manufacture confidence
        0.0
    };
    let tier = ConfidenceTier::from_confidence(confidence);

    let candidates = top
        .iter()
        .map(|c| KeyCandidate {
            confidence: safe_share(c.score, total),
            ..*c
        })
        .collect();

    let advice = (tier == ConfidenceTier::Low).then(|| advice_for(hints));

    log::debug!(
        "Calibrated confidence: base={:.4}, final={:.4}, tier={}",
        base,
        confidence,
        tier.as_str()
    );

    Calibration {
        confidence,
        tier,
        candidates,
        advice,
    }
}

/// Apply the length and SNR adjustments, then clamp to [0, 1]
fn adjust(base: f64, hints: Option<&CalibrationHints>) -> f64 {
    let mut confidence = base;

    if let Some(hints) = hints {
        if let Some(length) = hints.length_sec {
            let (lo, hi) = LENGTH_BONUS_RANGE_SEC;
            if (lo..=hi).contains(&length) {
                confidence += LENGTH_BONUS;
            }
        }

        if let Some(snr) = hints.snr_db {
            if snr > SNR_BONUS_ABOVE_DB {
                confidence += SNR_BONUS;
            } else if snr < SNR_PENALTY_BELOW_DB {
                confidence -= SNR_PENALTY;
            }
        }
    }

    if confidence.is_finite() {
        confidence.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn advice_for(hints: Option<&CalibrationHints>) -> String {
    let mut advice = ADVICE_RERECORD.to_string();
    if hints.is_some_and(CalibrationHints::is_noisy) {
        advice.push(' ');
        advice.push_str(ADVICE_NOISE);
    }
    advice
}

/// `part / total` clamped to [0, 1], or 0 on an unsafe divide
fn safe_share(part: f64, total: f64) -> f64 {
    if !(total.is_finite() && total > 0.0 && part.is_finite()) {
        return 0.0;
    }
    (part / total).clamp(0.0, 1.0)
}
