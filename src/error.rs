//! Error types for the key estimation engine

use thiserror::Error;

/// Errors that can occur during key estimation
///
/// Only malformed input is an error. A structurally valid but silent
/// recording completes normally with zero confidence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// Invalid input parameters (empty buffer, bad sample rate, malformed profile)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid analysis configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Audio decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// A result could not be serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The background worker is gone (thread panicked or was shut down)
    #[error("Worker unavailable: {0}")]
    WorkerUnavailable(String),
}
