//! Error types for the separation and pitch-shifting pipelines

use std::fmt;

/// Errors that can occur during separation or pitch shifting
#[derive(Debug, Clone)]
pub enum RepetError {
    /// Invalid input signal (empty buffer, zero sample rate, ...)
    InvalidInput(String),

    /// Invalid parameters (hop length larger than FFT size, ...)
    InvalidParameter(String),

    /// A detector could not find a peak clearing its threshold
    DetectionFailure(String),

    /// Numerical degeneracy during processing, such as a non-finite shift
    /// amount. All-silence and too-short inputs are not errors; the pipeline
    /// degrades to silent or fallback output for those instead.
    ProcessingError(String),
}

impl fmt::Display for RepetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepetError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            RepetError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            RepetError::DetectionFailure(msg) => write!(f, "Detection failure: {}", msg),
            RepetError::ProcessingError(msg) => write!(f, "Processing error: {}", msg),
        }
    }
}

impl std::error::Error for RepetError {}
