//! Estimation result types

use super::confidence::ConfidenceTier;
use super::metadata::AnalysisMetadata;
use crate::error::AnalysisError;
use crate::features::chroma::profile::PitchClassProfile;
use serde::{Deserialize, Serialize};

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

// A fifth is 7 semitones; 7 × 7 ≡ 1 (mod 12), so the same step maps
// tonics to wheel positions and back
const FIFTH: u32 = 7;

/// Musical mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Major (ionian)
    Major,
    /// Natural minor (aeolian)
    Minor,
}

/// Musical key hypothesis: tonic pitch class plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Major key (0 = C, 1 = C#, ..., 11 = B)
    Major(u32),
    /// Minor key (0 = C, 1 = C#, ..., 11 = B)
    Minor(u32),
}

impl Key {
    /// Build a key from a tonic pitch class (taken mod 12) and a mode
    pub fn new(tonic: u32, mode: Mode) -> Self {
        match mode {
            Mode::Major => Key::Major(tonic % 12),
            Mode::Minor => Key::Minor(tonic % 12),
        }
    }

    /// All 24 hypotheses in tie-break order: lower tonic first, major before minor
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_key::Key;
    ///
    /// let all = Key::all();
    /// assert_eq!(all.len(), 24);
    /// assert_eq!(all[0], Key::Major(0));
    /// assert_eq!(all[1], Key::Minor(0));
    /// assert_eq!(all[2], Key::Major(1));
    /// ```
    pub fn all() -> [Key; 24] {
        let mut keys = [Key::Major(0); 24];
        for tonic in 0..12u32 {
            keys[tonic as usize * 2] = Key::Major(tonic);
            keys[tonic as usize * 2 + 1] = Key::Minor(tonic);
        }
        keys
    }

    /// Tonic pitch class (0-11)
    pub fn tonic(&self) -> u32 {
        match self {
            Key::Major(i) | Key::Minor(i) => *i % 12,
        }
    }

    /// Mode of the key
    pub fn mode(&self) -> Mode {
        match self {
            Key::Major(_) => Mode::Major,
            Key::Minor(_) => Mode::Minor,
        }
    }

    /// Transpose the tonic up by `semitones` (mod 12), keeping the mode
    pub fn transpose(&self, semitones: u32) -> Self {
        Key::new(self.tonic() + semitones % 12, self.mode())
    }

    /// Short label: the tonic's note name, with an "m" suffix for minor
    ///
    /// Sharps are used throughout, never flats.
    ///
    /// ```
    /// use cadence_key::Key;
    ///
    /// assert_eq!(Key::Major(10).name(), "A#");
    /// assert_eq!(Key::Minor(4).name(), "Em");
    /// assert_eq!(format!("{}", Key::Minor(6)), "F#m");
    /// ```
    pub fn name(&self) -> String {
        match self {
            Key::Major(i) => NOTE_NAMES[*i as usize % 12].to_string(),
            Key::Minor(i) => format!("{}m", NOTE_NAMES[*i as usize % 12]),
        }
    }

    /// Position on the DJ key wheel, "1A" through "12B"
    ///
    /// The number counts fifths upward from C (majors, suffix A) or from
    /// A (minors, suffix B). A key and its relative share a number, so
    /// harmonically compatible keys sit next to each other.
    ///
    /// ```
    /// use cadence_key::Key;
    ///
    /// assert_eq!(Key::Major(2).numerical(), "3A");  // D: two fifths above C
    /// assert_eq!(Key::Minor(11).numerical(), "3B"); // Bm: relative of D
    /// assert_eq!(Key::Major(5).numerical(), "12A"); // F: one fifth below C
    /// ```
    pub fn numerical(&self) -> String {
        let (major_tonic, suffix) = match self {
            Key::Major(_) => (self.tonic(), 'A'),
            Key::Minor(_) => ((self.tonic() + 3) % 12, 'B'),
        };
        format!("{}{}", major_tonic * FIFTH % 12 + 1, suffix)
    }

    /// Inverse of [`Key::numerical`]
    ///
    /// Anything that is not a wheel position followed by `A` or `B`
    /// yields `None`.
    ///
    /// ```
    /// use cadence_key::Key;
    ///
    /// assert_eq!(Key::from_numerical("3A"), Some(Key::Major(2)));
    /// assert_eq!(Key::from_numerical("12B"), Some(Key::Minor(2)));
    /// assert_eq!(Key::from_numerical("3a"), None);
    /// ```
    pub fn from_numerical(notation: &str) -> Option<Self> {
        let (position, mode) = if let Some(n) = notation.strip_suffix('A') {
            (n, Mode::Major)
        } else {
            (notation.strip_suffix('B')?, Mode::Minor)
        };
        if !position.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let position: u32 = position.parse().ok()?;
        if !(1..=12).contains(&position) {
            return None;
        }

        let major_tonic = (position - 1) * FIFTH % 12;
        Some(match mode {
            Mode::Major => Key::Major(major_tonic),
            Mode::Minor => Key::Minor((major_tonic + 9) % 12),
        })
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

/// A ranked key hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyCandidate {
    /// The hypothesis
    pub key: Key,

    /// Raw ranking score (comparable only within one ranking)
    pub score: f64,

    /// Relative share among the top three candidates (0.0-1.0)
    /// Zero until the ranking has been calibrated
    pub confidence: f64,
}

impl KeyCandidate {
    /// Uncalibrated candidate
    pub fn new(key: Key, score: f64) -> Self {
        Self {
            key,
            score,
            confidence: 0.0,
        }
    }
}

/// Complete key estimation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEstimate {
    /// Top candidates (at most three), best first, each with its relative share
    pub candidates: Vec<KeyCandidate>,

    /// Calibrated confidence of the top candidate (0.0-1.0)
    pub confidence: f64,

    /// Confidence tier
    pub tier: ConfidenceTier,

    /// The pitch-class profile the ranking was computed from
    pub profile: PitchClassProfile,

    /// Recording advice, present only for the low tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,

    /// Analysis metadata
    pub metadata: AnalysisMetadata,
}

impl KeyEstimate {
    /// Best key, if any candidate was produced
    pub fn key(&self) -> Option<Key> {
        self.candidates.first().map(|c| c.key)
    }

    /// Serialize to a JSON string
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::SerializationError` if serde_json rejects the value.
    pub fn to_json(&self) -> Result<String, AnalysisError> {
        serde_json::to_string(self)
            .map_err(|e| AnalysisError::SerializationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_name_major() {
        assert_eq!(Key::Major(0).name(), "C");
        assert_eq!(Key::Major(1).name(), "C#");
        assert_eq!(Key::Major(6).name(), "F#");
        assert_eq!(Key::Major(11).name(), "B");
    }

    #[test]
    fn test_key_name_minor() {
        assert_eq!(Key::Minor(0).name(), "Cm");
        assert_eq!(Key::Minor(9).name(), "Am");
        assert_eq!(Key::Minor(11).name(), "Bm");
    }

    #[test]
    fn test_key_numerical() {
        assert_eq!(Key::Major(0).numerical(), "1A");
        assert_eq!(Key::Major(5).numerical(), "12A");
        assert_eq!(Key::Minor(9).numerical(), "1B");
        assert_eq!(Key::Minor(2).numerical(), "12B");
    }

    #[test]
    fn test_key_from_numerical() {
        assert_eq!(Key::from_numerical("7A"), Some(Key::Major(6)));
        assert_eq!(Key::from_numerical("10B"), Some(Key::Minor(0)));
        assert_eq!(Key::from_numerical("0A"), None);
        assert_eq!(Key::from_numerical("1C"), None);
        assert_eq!(Key::from_numerical(""), None);
        assert_eq!(Key::from_numerical("A"), None);
        assert_eq!(Key::from_numerical("+3A"), None);
        assert_eq!(Key::from_numerical("13B"), None);
    }

    #[test]
    fn test_key_numerical_roundtrip() {
        for key in Key::all() {
            assert_eq!(Key::from_numerical(&key.numerical()), Some(key), "{}", key);
        }
    }

    #[test]
    fn test_transpose_wraps() {
        assert_eq!(Key::Major(10).transpose(3), Key::Major(1));
        assert_eq!(Key::Minor(9).transpose(12), Key::Minor(9));
        assert_eq!(Key::new(14, Mode::Minor), Key::Minor(2));
    }

    #[test]
    fn test_all_order() {
        let all = Key::all();
        for (i, key) in all.iter().enumerate() {
            assert_eq!(key.tonic() as usize, i / 2);
            let expected = if i % 2 == 0 { Mode::Major } else { Mode::Minor };
            assert_eq!(key.mode(), expected);
        }
    }

    #[test]
    fn test_to_json_omits_missing_advice() {
        use crate::features::key::Correlator;

        let mut estimate = KeyEstimate {
            candidates: vec![KeyCandidate::new(Key::Minor(4), 0.7)],
            confidence: 0.9,
            tier: ConfidenceTier::High,
            profile: PitchClassProfile::zero(),
            advice: None,
            metadata: AnalysisMetadata::for_profile(Correlator::DiatonicMask),
        };
        let json = estimate.to_json().unwrap();
        assert!(json.contains("\"candidates\":[{\"key\":{\"Minor\":4}"));
        assert!(json.contains("\"correlator\":\"diatonic_mask\""));
        assert!(!json.contains("advice"));

        estimate.advice = Some("Re-record".to_string());
        assert!(estimate.to_json().unwrap().contains("\"advice\":\"Re-record\""));
    }
}
