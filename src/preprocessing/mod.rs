//! Audio preprocessing modules
//!
//! Utilities for preparing audio for analysis:
//! - Channel mixing (interleaved multi-channel to mono)
//! - Per-frame silence gating

pub mod channel_mixer;
pub mod silence;
