//! Background key estimation
//!
//! [`KeyWorker`] owns one analysis thread fed over a `crossbeam-channel`
//! request queue. Buffers are moved into the worker, so no state is shared
//! with the caller. Each submission gets its own reply channel, wrapped in a
//! [`PendingEstimate`].
//!
//! # Example
//!
//! ```
//! use cadence_key::{AnalysisConfig, KeyWorker, SampleBuffer};
//!
//! let worker = KeyWorker::spawn(AnalysisConfig::default())?;
//! let buffer = SampleBuffer::new(vec![0.0; 22050], 22050)?;
//!
//! let pending = worker.submit(buffer, None)?;
//! let estimate = pending.wait()?;
//! assert_eq!(estimate.confidence, 0.0);
//! # Ok::<(), cadence_key::AnalysisError>(())
//! ```

use crate::analysis::confidence::CalibrationHints;
use crate::analysis::result::KeyEstimate;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::estimate_key;
use crate::io::sample_buffer::SampleBuffer;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

type Reply = Result<KeyEstimate, AnalysisError>;

struct Job {
    buffer: SampleBuffer,
    hints: Option<CalibrationHints>,
    reply: Sender<Reply>,
}

/// Handle to a background estimation thread
///
/// Dropping the worker closes the request queue and joins the thread after
/// it finishes the jobs already queued.
pub struct KeyWorker {
    requests: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl KeyWorker {
    /// Start the worker thread
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` for an unusable configuration
    /// and `AnalysisError::WorkerUnavailable` if the thread cannot be spawned.
    pub fn spawn(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;

        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let handle = thread::Builder::new()
            .name("cadence-key-worker".to_string())
            .spawn(move || run(rx, config))
            .map_err(|e| AnalysisError::WorkerUnavailable(format!("Cannot spawn thread: {}", e)))?;

        Ok(Self {
            requests: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queue a recording for estimation
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::WorkerUnavailable` if the worker thread has exited.
    pub fn submit(
        &self,
        buffer: SampleBuffer,
        hints: Option<CalibrationHints>,
    ) -> Result<PendingEstimate, AnalysisError> {
        let requests = self
            .requests
            .as_ref()
            .ok_or_else(|| AnalysisError::WorkerUnavailable("Worker shut down".to_string()))?;

        let (reply, receiver) = crossbeam_channel::bounded(1);
        requests
            .send(Job {
                buffer,
                hints,
                reply,
            })
            .map_err(|_| AnalysisError::WorkerUnavailable("Worker thread exited".to_string()))?;

        Ok(PendingEstimate { receiver })
    }
}

impl Drop for KeyWorker {
    fn drop(&mut self) {
        // Closing the queue ends the receive loop
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Key worker thread panicked");
            }
        }
    }
}

fn run(requests: Receiver<Job>, config: AnalysisConfig) {
    log::debug!("Key worker started");
    for job in requests.iter() {
        let result = estimate_key(
            job.buffer.samples(),
            job.buffer.sample_rate(),
            job.hints.as_ref(),
            &config,
        );
        // The caller may have dropped its PendingEstimate
        if job.reply.send(result).is_err() {
            log::debug!("Estimate discarded, nobody is waiting for it");
        }
    }
    log::debug!("Key worker stopped");
}

/// An estimate that is being computed on the worker thread
pub struct PendingEstimate {
    receiver: Receiver<Reply>,
}

impl PendingEstimate {
    /// Block until the estimate is ready
    ///
    /// # Errors
    ///
    /// Propagates the estimation error, or returns
    /// `AnalysisError::WorkerUnavailable` if the worker died before replying.
    pub fn wait(self) -> Result<KeyEstimate, AnalysisError> {
        self.receiver.recv().map_err(|_| {
            AnalysisError::WorkerUnavailable("Worker exited before replying".to_string())
        })?
    }

    /// Poll for the estimate without blocking
    ///
    /// Returns `None` while the estimate is still being computed.
    pub fn try_result(&self) -> Option<Result<KeyEstimate, AnalysisError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(AnalysisError::WorkerUnavailable(
                "Worker exited before replying".to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::confidence::ConfidenceTier;
    use std::time::Duration;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> SampleBuffer {
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        SampleBuffer::new(samples, sample_rate).unwrap()
    }

    #[test]
    fn test_spawn_rejects_bad_config() {
        let config = AnalysisConfig {
            min_window: 0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            KeyWorker::spawn(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_results_match_direct_call() {
        let config = AnalysisConfig::default();
        let worker = KeyWorker::spawn(config.clone()).unwrap();
        let buffer = tone(261.63, 22050, 2.0);

        let direct = estimate_key(buffer.samples(), buffer.sample_rate(), None, &config).unwrap();
        let queued = worker.submit(buffer, None).unwrap().wait().unwrap();

        assert_eq!(queued.key(), direct.key());
        assert_eq!(queued.confidence, direct.confidence);
        assert_eq!(queued.profile, direct.profile);
    }

    #[test]
    fn test_jobs_are_independent() {
        let worker = KeyWorker::spawn(AnalysisConfig::default()).unwrap();
        let silent = SampleBuffer::new(vec![0.0; 8000], 8000).unwrap();

        let first = worker.submit(tone(440.0, 22050, 1.0), None).unwrap();
        let second = worker.submit(silent, None).unwrap();

        assert!(first.wait().unwrap().confidence > 0.0);
        let silent_estimate = second.wait().unwrap();
        assert_eq!(silent_estimate.confidence, 0.0);
        assert_eq!(silent_estimate.tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_try_result_eventually_ready() {
        let worker = KeyWorker::spawn(AnalysisConfig::default()).unwrap();
        let pending = worker.submit(tone(330.0, 8000, 0.5), None).unwrap();

        let mut result = None;
        for _ in 0..500 {
            result = pending.try_result();
            if result.is_some() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(result, Some(Ok(_))));
    }

    #[test]
    fn test_drop_waits_for_queued_jobs() {
        let worker = KeyWorker::spawn(AnalysisConfig::default()).unwrap();
        let pending = worker.submit(tone(220.0, 8000, 0.5), None).unwrap();
        drop(worker);
        assert!(pending.wait().is_ok());
    }
}
