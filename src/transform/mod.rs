//! Short-time Fourier transform and its inverse
//!
//! Windowed, overlapping frame-wise frequency analysis and overlap-add
//! resynthesis. Every other pipeline stage operates on the [`Spectrogram`]
//! produced here.

pub mod stft;
pub mod window;

pub use stft::{forward, inverse, Spectrogram};
pub use window::hann_window;
