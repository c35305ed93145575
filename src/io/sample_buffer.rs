//! Owned mono sample buffers and overlapping frame iteration

use crate::error::AnalysisError;

/// Mono audio recording: samples in roughly [-1.0, 1.0] plus their sample rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap samples, rejecting an empty buffer or a zero sample rate
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AnalysisError> {
        validate(&samples, sample_rate)?;
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// The samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false for a constructed buffer; provided for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Check the raw-audio input contract
pub fn validate(samples: &[f32], sample_rate: u32) -> Result<(), AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput("Empty audio samples".to_string()));
    }
    if sample_rate == 0 {
        return Err(AnalysisError::InvalidInput("Invalid sample rate".to_string()));
    }
    Ok(())
}

/// One analysis frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Index of the first sample
    pub start: usize,
    /// Samples covered by the frame; shorter than the window for the final
    /// frame (the caller zero-pads)
    pub samples: &'a [f32],
}

impl Frame<'_> {
    /// Index one past the last covered sample
    pub fn end(&self) -> usize {
        self.start + self.samples.len()
    }
}

/// Iterator over overlapping frames
///
/// Frames start every `hop_size` samples. The last frame may be partial so
/// that the tail of the recording is always covered; a recording shorter
/// than one window yields a single partial frame.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    samples: &'a [f32],
    window_size: usize,
    hop_size: usize,
    next_start: usize,
    done: bool,
}

impl<'a> Frames<'a> {
    /// Frame `samples` with the given window and hop (both clamped to >= 1)
    pub fn new(samples: &'a [f32], window_size: usize, hop_size: usize) -> Self {
        Self {
            samples,
            window_size: window_size.max(1),
            hop_size: hop_size.max(1),
            next_start: 0,
            done: samples.is_empty(),
        }
    }

    /// Total number of frames the iterator yields
    pub fn count_total(samples_len: usize, window_size: usize, hop_size: usize) -> usize {
        if samples_len == 0 {
            return 0;
        }
        let window_size = window_size.max(1);
        let hop_size = hop_size.max(1);
        if samples_len <= window_size {
            1
        } else {
            1 + (samples_len - window_size).div_ceil(hop_size)
        }
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = self.next_start;
        let end = (start + self.window_size).min(self.samples.len());
        if end >= self.samples.len() {
            self.done = true;
        }
        self.next_start += self.hop_size;
        Some(Frame {
            start,
            samples: &self.samples[start..end],
        })
    }
}
