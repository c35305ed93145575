//! Audio I/O modules
//!
//! File decoding (Symphonia) and owned mono sample buffers.

pub mod decoder;
pub mod sample_buffer;
