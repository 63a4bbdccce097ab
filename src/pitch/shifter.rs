//! Phase-vocoder pitch shifting
//!
//! Shifts pitch by a ratio `r = 2^(semitones / 12)` while preserving
//! duration: the signal is first time-stretched by `r` with a phase vocoder
//! (per-bin instantaneous-frequency tracking keeps cross-frame phase
//! coherence), then resampled back to the original sample count, which scales
//! every frequency by `r`.

use crate::error::RepetError;
use crate::transform::{forward, hann_window, inverse, Spectrogram};
use rustfft::num_complex::Complex;
use std::f32::consts::{PI, TAU};

/// Shifts smaller than this many semitones are treated as the identity
const IDENTITY_SEMITONES: f32 = 1e-3;

/// Convert a source/target frequency pair to a semitone delta
///
/// `12 * log2(target / source)`; positive when the target is higher.
pub fn semitones_from_frequencies(source_hz: f32, target_hz: f32) -> f32 {
    12.0 * (target_hz / source_hz).log2()
}

/// Pitch-shift a signal by a signed number of semitones
///
/// A zero (or near-zero) shift returns the input unchanged. Extreme ratios
/// are accepted; quality degrades but no error is raised.
///
/// # Arguments
///
/// * `signal` - Mono input samples
/// * `semitones` - Signed shift; one semitone is a frequency ratio of 2^(1/12)
/// * `n_fft` - Phase-vocoder FFT size (analysis hop is `n_fft / 4`)
///
/// # Returns
///
/// Shifted signal with exactly the input's sample count
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for an empty signal,
/// `RepetError::InvalidParameter` for an FFT size below 4, and
/// `RepetError::ProcessingError` for a non-finite shift amount (which target
/// frequency conversions can produce from degenerate inputs).
pub fn pitch_shift_semitones(
    signal: &[f32],
    semitones: f32,
    n_fft: usize,
) -> Result<Vec<f32>, RepetError> {
    if signal.is_empty() {
        return Err(RepetError::InvalidInput("empty signal".to_string()));
    }

    if n_fft < 4 {
        return Err(RepetError::InvalidParameter(format!(
            "n_fft ({}) too small for phase vocoder analysis",
            n_fft
        )));
    }

    if !semitones.is_finite() {
        return Err(RepetError::ProcessingError(format!(
            "non-finite semitone shift ({})",
            semitones
        )));
    }

    if semitones.abs() < IDENTITY_SEMITONES {
        return Ok(signal.to_vec());
    }

    let ratio = 2.0f32.powf(semitones / 12.0);
    log::debug!(
        "Pitch shift: {:+.2} semitones (ratio {:.4}), {} samples",
        semitones,
        ratio,
        signal.len()
    );

    let stretched = time_stretch(signal, n_fft, ratio)?;
    Ok(resample_linear(&stretched, signal.len()))
}

/// Time-stretch a signal by `ratio` with a phase vocoder
///
/// Analysis runs at hop `n_fft / 4`; synthesis at `round(hop * ratio)`. For
/// each bin the wrapped deviation between the measured and expected phase
/// advance yields an instantaneous-frequency estimate, which drives the
/// accumulated synthesis phase. Output length is trimmed to
/// `round(len * hop_s / hop_a)` so the effective stretch matches the hop
/// ratio exactly.
///
/// # Errors
///
/// Propagates transform errors for degenerate inputs.
pub fn time_stretch(signal: &[f32], n_fft: usize, ratio: f32) -> Result<Vec<f32>, RepetError> {
    let hop_analysis = (n_fft / 4).max(1);
    let hop_synthesis = ((hop_analysis as f32 * ratio).round() as usize).max(1);

    let window = hann_window(n_fft);
    let spectrogram = forward(signal, n_fft, hop_analysis, &window)?;
    let num_bins = spectrogram.num_bins();

    let mut prev_phase = vec![0.0f32; num_bins];
    let mut phase_accum = vec![0.0f32; num_bins];
    let mut out_frames: Vec<Vec<Complex<f32>>> = Vec::with_capacity(spectrogram.num_frames());

    for (t, frame) in spectrogram.frames().iter().enumerate() {
        let mut out_frame = Vec::with_capacity(num_bins);

        for (k, &cell) in frame.iter().enumerate() {
            let (magnitude, phase) = cell.to_polar();
            let expected = TAU * k as f32 * hop_analysis as f32 / n_fft as f32;

            if t == 0 {
                // First frame: take the analysis phase as-is
                phase_accum[k] = phase;
            } else {
                let deviation = wrap_phase(phase - prev_phase[k] - expected);
                let advance = (expected + deviation) * hop_synthesis as f32 / hop_analysis as f32;
                phase_accum[k] = wrap_phase(phase_accum[k] + advance);
            }

            prev_phase[k] = phase;
            out_frame.push(Complex::from_polar(magnitude, phase_accum[k]));
        }

        out_frames.push(out_frame);
    }

    let stretched_spec = Spectrogram::from_frames(out_frames, n_fft, hop_synthesis)?;
    let mut stretched = inverse(&stretched_spec, &window)?;

    // Trim the analysis-window tail so the stretch factor is exactly
    // hop_synthesis / hop_analysis
    let target_len = ((signal.len() as f64 * hop_synthesis as f64 / hop_analysis as f64).round()
        as usize)
        .max(1);
    stretched.resize(target_len, 0.0);

    Ok(stretched)
}

/// Wrap a phase value into (-pi, pi]
fn wrap_phase(phase: f32) -> f32 {
    if phase >= 0.0 {
        (phase + PI) % TAU - PI
    } else {
        (phase - PI) % TAU + PI
    }
}

/// Resample a signal to a target sample count by linear interpolation
fn resample_linear(signal: &[f32], target_len: usize) -> Vec<f32> {
    if target_len == 0 || signal.is_empty() {
        return vec![];
    }

    if signal.len() == 1 || target_len == 1 {
        return vec![signal[0]; target_len];
    }

    let step = (signal.len() - 1) as f64 / (target_len - 1) as f64;
    (0..target_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos.floor() as usize).min(signal.len() - 2);
            let frac = (pos - idx as f64) as f32;
            signal[idx] * (1.0 - frac) + signal[idx + 1] * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_zero_shift_is_identity() {
        let signal = sine(440.0, 22050, 8192);
        let shifted = pitch_shift_semitones(&signal, 0.0, 2048).unwrap();
        assert_eq!(shifted, signal);
    }

    #[test]
    fn test_shift_preserves_length() {
        let signal = sine(440.0, 22050, 10_000);
        for semitones in [-7.0, -3.0, 2.0, 5.0, 12.0] {
            let shifted = pitch_shift_semitones(&signal, semitones, 2048).unwrap();
            assert_eq!(shifted.len(), signal.len());
        }
    }

    #[test]
    fn test_time_stretch_length() {
        let signal = sine(440.0, 22050, 22050);
        let stretched = time_stretch(&signal, 2048, 2.0).unwrap();

        let expected = (22050.0f64 * (1024.0 / 512.0)).round() as usize;
        assert_eq!(stretched.len(), expected);
    }

    #[test]
    fn test_semitones_from_frequencies() {
        assert!((semitones_from_frequencies(440.0, 880.0) - 12.0).abs() < 1e-5);
        assert!((semitones_from_frequencies(880.0, 440.0) + 12.0).abs() < 1e-5);
        assert!(semitones_from_frequencies(392.0, 440.0) > 0.0);
        assert!(semitones_from_frequencies(440.0, 440.0).abs() < 1e-6);
    }

    #[test]
    fn test_wrap_phase_range() {
        for phase in [-10.0f32, -PI, -0.5, 0.0, 0.5, PI, 10.0, 100.0] {
            let wrapped = wrap_phase(phase);
            assert!(
                (-PI..=PI + 1e-5).contains(&wrapped),
                "wrap_phase({}) = {}",
                phase,
                wrapped
            );
        }
    }

    #[test]
    fn test_resample_linear_endpoints() {
        let signal = vec![0.0, 1.0, 2.0, 3.0];
        let resampled = resample_linear(&signal, 7);

        assert_eq!(resampled.len(), 7);
        assert_eq!(resampled[0], 0.0);
        assert_eq!(resampled[6], 3.0);
        assert!((resampled[3] - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_resample_linear_downsample() {
        let signal: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let resampled = resample_linear(&signal, 50);

        assert_eq!(resampled.len(), 50);
        assert_eq!(resampled[0], 0.0);
        assert_eq!(resampled[49], 99.0);
    }

    #[test]
    fn test_empty_signal_rejected() {
        assert!(pitch_shift_semitones(&[], 3.0, 2048).is_err());
    }

    #[test]
    fn test_non_finite_shift_rejected() {
        let signal = sine(440.0, 22050, 1000);
        assert!(matches!(
            pitch_shift_semitones(&signal, f32::NAN, 2048),
            Err(RepetError::ProcessingError(_))
        ));
        assert!(matches!(
            pitch_shift_semitones(&signal, f32::INFINITY, 2048),
            Err(RepetError::ProcessingError(_))
        ));
    }

    #[test]
    fn test_tiny_fft_rejected() {
        let signal = sine(440.0, 22050, 1000);
        assert!(pitch_shift_semitones(&signal, 3.0, 2).is_err());
    }
}
