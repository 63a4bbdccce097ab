//! Beat spectrum computation
//!
//! Reveals the repeating period of a mixture by autocorrelating its magnitude
//! spectrogram along the time axis. Each frequency bin is autocorrelated
//! independently using FFT acceleration (`ACF = IFFT(|FFT(x)|^2)`), then the
//! per-bin functions are averaged; per-bin correlation is more robust to
//! narrowband interference than correlating a single summed energy curve.

use crate::error::RepetError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Only the lowest bins carry most of the rhythmic energy; correlating every
/// bin of a 2048-point transform adds cost without improving the estimate.
const MAX_BEAT_SPECTRUM_BINS: usize = 100;

/// Compute the beat spectrum of a magnitude spectrogram
///
/// # Arguments
///
/// * `magnitude` - Magnitude spectrogram, time-major (`magnitude[frame][bin]`)
///
/// # Returns
///
/// Autocorrelation scores indexed by lag, normalized so the zero-lag value
/// is 1.0. Length equals the frame count.
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` if the spectrogram is empty or has
/// fewer than two frames.
pub fn beat_spectrum(magnitude: &[Vec<f32>]) -> Result<Vec<f32>, RepetError> {
    if magnitude.is_empty() || magnitude[0].is_empty() {
        return Err(RepetError::InvalidInput(
            "empty magnitude spectrogram".to_string(),
        ));
    }

    let num_frames = magnitude.len();
    if num_frames < 2 {
        return Err(RepetError::InvalidInput(
            "need at least two frames for a beat spectrum".to_string(),
        ));
    }

    let num_bins = magnitude[0].len().min(MAX_BEAT_SPECTRUM_BINS);

    log::debug!(
        "Computing beat spectrum: {} frames, {} of {} bins",
        num_frames,
        num_bins,
        magnitude[0].len()
    );

    // Zero-pad to 2n so the circular FFT autocorrelation is linear
    let fft_size = (2 * num_frames).next_power_of_two();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    let ifft = planner.plan_fft_inverse(fft_size);

    let mut accumulated = vec![0.0f64; num_frames];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); fft_size];

    for bin in 0..num_bins {
        for (t, slot) in buffer.iter_mut().take(num_frames).enumerate() {
            *slot = Complex::new(magnitude[t][bin], 0.0);
        }
        for slot in buffer.iter_mut().skip(num_frames) {
            *slot = Complex::new(0.0, 0.0);
        }

        fft.process(&mut buffer);
        for x in &mut buffer {
            *x = Complex::new(x.norm_sqr(), 0.0);
        }
        ifft.process(&mut buffer);

        let scale = 1.0 / fft_size as f64;
        for (lag, acc) in accumulated.iter_mut().enumerate() {
            *acc += (buffer[lag].re as f64 * scale).max(0.0);
        }
    }

    // Average across bins and normalize by the zero-lag value
    let zero_lag = accumulated[0] / num_bins as f64;
    let spectrum: Vec<f32> = if zero_lag > EPSILON as f64 {
        accumulated
            .iter()
            .map(|&v| (v / num_bins as f64 / zero_lag) as f32)
            .collect()
    } else {
        // All-silence input: flat beat spectrum, the caller falls back
        vec![0.0; num_frames]
    };

    Ok(spectrum)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Magnitude spectrogram with an exact repetition every `period` frames
    fn periodic_magnitude(num_frames: usize, num_bins: usize, period: usize) -> Vec<Vec<f32>> {
        (0..num_frames)
            .map(|t| {
                let phase = t % period;
                (0..num_bins)
                    .map(|bin| if phase == 0 { 1.0 + bin as f32 * 0.1 } else { 0.1 })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_beat_spectrum_peaks_at_period() {
        let magnitude = periodic_magnitude(64, 20, 8);
        let bs = beat_spectrum(&magnitude).unwrap();

        assert_eq!(bs.len(), 64);
        assert!((bs[0] - 1.0).abs() < 1e-4, "zero lag should normalize to 1");

        // The period lag must stand out over its non-multiple neighbors
        assert!(bs[8] > bs[5]);
        assert!(bs[8] > bs[11]);
    }

    #[test]
    fn test_beat_spectrum_silence_is_flat() {
        let magnitude = vec![vec![0.0f32; 16]; 32];
        let bs = beat_spectrum(&magnitude).unwrap();
        assert!(bs.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_beat_spectrum_rejects_degenerate_input() {
        assert!(beat_spectrum(&[]).is_err());
        assert!(beat_spectrum(&[vec![1.0, 2.0]]).is_err());
    }
}
