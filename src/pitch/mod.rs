//! Pitch detection and pitch shifting
//!
//! - Autocorrelation fundamental-frequency estimation
//! - Phase-vocoder time stretch plus resampling for duration-preserving
//!   pitch shifts

pub mod detector;
pub mod shifter;

pub use detector::detect_pitch;
pub use shifter::{pitch_shift_semitones, semitones_from_frequencies};
