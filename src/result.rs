//! Separation result types

use serde::{Deserialize, Serialize};

/// Metadata describing one separation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeparationMetadata {
    /// Input duration in seconds
    pub duration_seconds: f32,

    /// Wall-clock processing time in milliseconds
    pub processing_time_ms: f32,

    /// Detected (or fallback) repeating period in frames
    pub period_frames: usize,

    /// Repeating period in seconds
    pub period_seconds: f32,

    /// True if period detection failed and the configured fallback was used
    pub period_from_fallback: bool,
}

/// Result of separating a mixture into vocal and instrumental components
///
/// Both signals share the input's sample rate and sample count.
#[derive(Debug, Clone)]
pub struct SeparationResult {
    /// Non-repeating (vocal) component
    pub vocal: Vec<f32>,

    /// Repeating (instrumental) component
    pub instrumental: Vec<f32>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Run metadata
    pub metadata: SeparationMetadata,
}
