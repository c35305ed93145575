//! Single-frequency energy detection (Goertzel resonator)
//!
//! Only ~150 discrete frequencies are queried per frame (every note of the
//! analysis range plus its two quarter-tone neighbours), so a bank of
//! second-order resonators is cheaper than a full spectrum.
//!
//! # Reference
//!
//! Goertzel, G. (1958). An Algorithm for the Evaluation of Finite Trigonometric Series.
//! *The American Mathematical Monthly*, 65(1), 34-35.

use std::f64::consts::PI;

/// Reference frequency for A4 (MIDI 69)
pub const A4_FREQ: f64 = 440.0;

/// Frequency in Hz of a (possibly fractional) MIDI note number
pub fn midi_to_freq(midi: f64) -> f64 {
    A4_FREQ * 2f64.powf((midi - 69.0) / 12.0)
}

/// Resonator tuned to one frequency
#[derive(Debug, Clone, Copy)]
pub struct Goertzel {
    coeff: f64,
}

impl Goertzel {
    /// Tune a resonator to `freq` Hz at `sample_rate`
    pub fn new(freq: f64, sample_rate: u32) -> Self {
        let omega = 2.0 * PI * freq / sample_rate as f64;
        Self {
            coeff: 2.0 * omega.cos(),
        }
    }

    /// Squared magnitude of the frame's spectrum at the tuned frequency
    ///
    /// Exact for non-integer bins: this evaluates the DTFT at the tuned
    /// angular frequency, not the nearest FFT bin.
    pub fn power(&self, frame: &[f64]) -> f64 {
        let mut s1 = 0.0;
        let mut s2 = 0.0;
        for &x in frame {
            let s0 = x + self.coeff * s1 - s2;
            s2 = s1;
            s1 = s0;
        }
        let power = s1 * s1 + s2 * s2 - self.coeff * s1 * s2;
        // Rounding can leave a tiny negative residue for near-zero input
        power.max(0.0)
    }
}
