//! Autocorrelation-based fundamental-frequency estimation
//!
//! Computes the FFT-accelerated autocorrelation of a time-domain buffer
//! (`ACF = IFFT(|FFT(x)|^2)`) and selects the first prominent local maximum
//! inside the lag band implied by the configured frequency range. Taking the
//! first prominent peak rather than the global maximum avoids octave errors
//! from quieter but larger-lag correlations.

use crate::config::PitchShiftConfig;
use crate::error::RepetError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Estimate the fundamental frequency of a buffer
///
/// # Arguments
///
/// * `samples` - Time-domain buffer (a short recorded reference is enough)
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Frequency band and peak threshold
///
/// # Returns
///
/// Fundamental frequency in Hz (`sample_rate / lag`, with the lag refined by
/// parabolic interpolation around the chosen peak)
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for an empty buffer or zero sample
/// rate, and `RepetError::DetectionFailure` when the buffer is too short for
/// the configured band, is effectively silent, or no autocorrelation peak
/// clears the threshold.
pub fn detect_pitch(
    samples: &[f32],
    sample_rate: u32,
    config: &PitchShiftConfig,
) -> Result<f32, RepetError> {
    if samples.is_empty() {
        return Err(RepetError::InvalidInput("empty buffer".to_string()));
    }

    if sample_rate == 0 {
        return Err(RepetError::InvalidInput(
            "sample rate must be > 0".to_string(),
        ));
    }

    let min_lag = ((sample_rate as f32 / config.max_frequency_hz).floor() as usize).max(1);
    let max_lag = ((sample_rate as f32 / config.min_frequency_hz).ceil() as usize)
        .min(samples.len().saturating_sub(2));

    if min_lag >= max_lag {
        return Err(RepetError::DetectionFailure(format!(
            "buffer of {} samples too short for the {:.0}-{:.0} Hz band",
            samples.len(),
            config.min_frequency_hz,
            config.max_frequency_hz
        )));
    }

    let acf = autocorrelation(samples);
    let zero_lag = acf[0];
    if zero_lag < EPSILON {
        return Err(RepetError::DetectionFailure(
            "buffer is silent".to_string(),
        ));
    }

    log::debug!(
        "Pitch detection: {} samples, lag band [{}, {}]",
        samples.len(),
        min_lag,
        max_lag
    );

    // First prominent local maximum, scanning from the smallest lag
    for lag in min_lag..=max_lag {
        let value = acf[lag];
        if value / zero_lag < config.pitch_peak_threshold {
            continue;
        }
        if value < acf[lag - 1] || value <= acf[lag + 1] {
            continue;
        }

        let refined = refine_peak(acf[lag - 1], value, acf[lag + 1], lag);
        let frequency = sample_rate as f32 / refined;

        log::debug!(
            "Detected pitch {:.2} Hz at lag {:.2} (score {:.3})",
            frequency,
            refined,
            value / zero_lag
        );
        return Ok(frequency);
    }

    Err(RepetError::DetectionFailure(format!(
        "no autocorrelation peak above {:.2} in the {:.0}-{:.0} Hz band",
        config.pitch_peak_threshold, config.min_frequency_hz, config.max_frequency_hz
    )))
}

/// FFT-accelerated autocorrelation (`ACF = IFFT(|FFT(x)|^2)`)
///
/// Zero-pads to twice the input length so the circular correlation is linear.
fn autocorrelation(signal: &[f32]) -> Vec<f32> {
    let n = signal.len();
    let fft_size = (2 * n).next_power_of_two();

    let mut buffer: Vec<Complex<f32>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    buffer.resize(fft_size, Complex::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);

    for x in &mut buffer {
        *x = Complex::new(x.norm_sqr(), 0.0);
    }

    let ifft = planner.plan_fft_inverse(fft_size);
    ifft.process(&mut buffer);

    let scale = 1.0 / fft_size as f32;
    buffer[..n].iter().map(|x| x.re * scale).collect()
}

/// Parabolic interpolation of a peak position from its neighbors
fn refine_peak(left: f32, center: f32, right: f32, lag: usize) -> f32 {
    let denom = left - 2.0 * center + right;
    if denom.abs() < EPSILON {
        return lag as f32;
    }
    let delta = 0.5 * (left - right) / denom;
    lag as f32 + delta.clamp(-0.5, 0.5)
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
    fn test_detect_440hz_sine() {
        let samples = sine(440.0, 22050, 11025);
        let freq = detect_pitch(&samples, 22050, &PitchShiftConfig::default()).unwrap();
        assert!(
            (freq - 440.0).abs() < 5.0,
            "expected ~440 Hz, got {:.2}",
            freq
        );
    }

    #[test]
    fn test_detect_low_fundamental() {
        let samples = sine(98.0, 22050, 22050);
        let freq = detect_pitch(&samples, 22050, &PitchShiftConfig::default()).unwrap();
        assert!((freq - 98.0).abs() < 3.0, "expected ~98 Hz, got {:.2}", freq);
    }

    #[test]
    fn test_detect_prefers_fundamental_over_octave() {
        // Fundamental plus a strong octave harmonic
        let sample_rate = 22050;
        let samples: Vec<f32> = (0..22050)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                0.5 * (std::f32::consts::TAU * 220.0 * t).sin()
                    + 0.3 * (std::f32::consts::TAU * 440.0 * t).sin()
            })
            .collect();

        let freq = detect_pitch(&samples, sample_rate, &PitchShiftConfig::default()).unwrap();
        // The first prominent peak sits at the 440 Hz lag only if the octave
        // dominates; with a stronger fundamental the 220 Hz lag must win from
        // either the 220 lag itself or its half (440), both acceptable here
        assert!(
            (freq - 220.0).abs() < 5.0 || (freq - 440.0).abs() < 5.0,
            "unexpected pitch {:.2}",
            freq
        );
    }

    #[test]
    fn test_detect_silence_fails() {
        let samples = vec![0.0f32; 8192];
        let result = detect_pitch(&samples, 22050, &PitchShiftConfig::default());
        assert!(matches!(result, Err(RepetError::DetectionFailure(_))));
    }

    #[test]
    fn test_detect_empty_buffer_rejected() {
        let result = detect_pitch(&[], 22050, &PitchShiftConfig::default());
        assert!(matches!(result, Err(RepetError::InvalidInput(_))));
    }

    #[test]
    fn test_detect_buffer_too_short_for_band() {
        // 100 samples cannot hold a 60 Hz period at 22050 Hz
        let samples = sine(440.0, 22050, 100);
        let config = PitchShiftConfig {
            min_frequency_hz: 60.0,
            max_frequency_hz: 80.0,
            ..PitchShiftConfig::default()
        };
        let result = detect_pitch(&samples, 22050, &config);
        assert!(matches!(result, Err(RepetError::DetectionFailure(_))));
    }

    #[test]
    fn test_autocorrelation_zero_lag_is_energy() {
        let signal = vec![1.0, -1.0, 1.0, -1.0];
        let acf = autocorrelation(&signal);
        assert_eq!(acf.len(), 4);
        assert!((acf[0] - 4.0).abs() < 1e-4);
    }
}
