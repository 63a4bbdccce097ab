//! Spectral separation stages
//!
//! The REPET pipeline, leaves first:
//! - Beat spectrum (per-bin autocorrelation of the magnitude spectrogram)
//! - Period estimation with graceful fallback
//! - Repeating-pattern template extraction and tiling
//! - Soft mask generation
//! - Masked resynthesis

pub mod beat_spectrum;
pub mod mask;
pub mod pattern;
pub mod period;
pub mod synthesis;

pub use period::PeriodEstimate;
