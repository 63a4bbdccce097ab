//! Masked resynthesis
//!
//! Applies a soft mask to the complex mixture spectrogram (scaling magnitude,
//! preserving the mixture phase at every cell) and inverse-transforms back to
//! the time domain at the original sample count.

use crate::error::RepetError;
use crate::transform::{inverse, Spectrogram};
use rustfft::num_complex::Complex;

/// Apply a soft mask to a complex spectrogram
///
/// The mask is a nonnegative real scale per cell, so multiplying the complex
/// value scales its magnitude while leaving the mixture phase untouched.
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` if the mask shape does not match the
/// spectrogram.
pub fn apply_mask(spectrogram: &Spectrogram, mask: &[Vec<f32>]) -> Result<Spectrogram, RepetError> {
    if mask.len() != spectrogram.num_frames() {
        return Err(RepetError::InvalidInput(format!(
            "mask has {} frames, spectrogram has {}",
            mask.len(),
            spectrogram.num_frames()
        )));
    }

    let mut frames: Vec<Vec<Complex<f32>>> = Vec::with_capacity(spectrogram.num_frames());
    for (frame, mask_frame) in spectrogram.frames().iter().zip(mask.iter()) {
        if mask_frame.len() != frame.len() {
            return Err(RepetError::InvalidInput(format!(
                "mask frame has {} bins, spectrogram has {}",
                mask_frame.len(),
                frame.len()
            )));
        }

        frames.push(
            frame
                .iter()
                .zip(mask_frame.iter())
                .map(|(&c, &m)| c * m)
                .collect(),
        );
    }

    Spectrogram::from_frames(frames, spectrogram.n_fft(), spectrogram.hop_length())
}

/// Resynthesize a masked spectrogram to the time domain
///
/// Inverse-transforms via the overlap-add ISTFT and trims or zero-pads the
/// result to exactly `target_len` samples.
///
/// # Errors
///
/// Propagates mask-shape and transform errors; never fails on well-formed
/// input (all-silence spectrograms produce silent output).
pub fn resynthesize(
    spectrogram: &Spectrogram,
    mask: &[Vec<f32>],
    window: &[f32],
    target_len: usize,
) -> Result<Vec<f32>, RepetError> {
    let masked = apply_mask(spectrogram, mask)?;
    let mut signal = inverse(&masked, window)?;
    signal.resize(target_len, 0.0);
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{forward, hann_window};

    fn sine(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_unity_mask_preserves_signal() {
        let signal = sine(440.0, 22050, 11025);
        let window = hann_window(1024);
        let spec = forward(&signal, 1024, 256, &window).unwrap();

        let mask = vec![vec![1.0f32; spec.num_bins()]; spec.num_frames()];
        let out = resynthesize(&spec, &mask, &window, signal.len()).unwrap();

        assert_eq!(out.len(), signal.len());
        let mut err = 0.0f64;
        let mut energy = 0.0f64;
        for i in 0..signal.len() {
            err += ((out[i] - signal[i]) as f64).powi(2);
            energy += (signal[i] as f64).powi(2);
        }
        assert!(err / energy < 1e-6);
    }

    #[test]
    fn test_zero_mask_yields_silence() {
        let signal = sine(440.0, 22050, 8000);
        let window = hann_window(1024);
        let spec = forward(&signal, 1024, 256, &window).unwrap();

        let mask = vec![vec![0.0f32; spec.num_bins()]; spec.num_frames()];
        let out = resynthesize(&spec, &mask, &window, signal.len()).unwrap();

        assert!(out.iter().all(|&x| x.abs() < 1e-7));
    }

    #[test]
    fn test_resynthesize_pads_to_target_length() {
        let signal = sine(440.0, 22050, 5000);
        let window = hann_window(512);
        let spec = forward(&signal, 512, 128, &window).unwrap();

        let mask = vec![vec![1.0f32; spec.num_bins()]; spec.num_frames()];
        let out = resynthesize(&spec, &mask, &window, 6000).unwrap();

        assert_eq!(out.len(), 6000);
        // Padding beyond the reconstructed extent is silent
        assert!(out[5900..].iter().all(|&x| x.abs() < 1e-6));
    }

    #[test]
    fn test_apply_mask_rejects_shape_mismatch() {
        let signal = sine(440.0, 22050, 4000);
        let window = hann_window(512);
        let spec = forward(&signal, 512, 128, &window).unwrap();

        let mask = vec![vec![1.0f32; spec.num_bins()]; spec.num_frames() - 1];
        assert!(apply_mask(&spec, &mask).is_err());

        let mask = vec![vec![1.0f32; 3]; spec.num_frames()];
        assert!(apply_mask(&spec, &mask).is_err());
    }
}
