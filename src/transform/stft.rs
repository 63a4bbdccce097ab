//! Forward and inverse short-time Fourier transform
//!
//! The forward transform segments the signal into overlapping windowed frames
//! and keeps the non-redundant half of each frame's spectrum. Analysis is
//! centered: the signal is zero-padded by half a window on both sides so that
//! every input sample, including the first, sits under full overlap-add
//! coverage. The inverse transform rebuilds the full conjugate-symmetric
//! spectrum per frame, overlap-adds the re-windowed inverse FFTs, normalizes
//! each output sample by the accumulated squared-window weight at that
//! position, and drops the centering lead-in again.

use crate::error::RepetError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Floor for the accumulated window-sum normalization
const WINDOW_SUM_EPSILON: f32 = 1e-8;

/// Complex spectrogram produced by [`forward`]
///
/// Frames are stored in time order; each frame holds `n_fft / 2 + 1`
/// frequency bins (the real-input transform is conjugate-symmetric, so the
/// upper half carries no information).
#[derive(Debug, Clone)]
pub struct Spectrogram {
    frames: Vec<Vec<Complex<f32>>>,
    n_fft: usize,
    hop_length: usize,
}

impl Spectrogram {
    /// Build a spectrogram from pre-computed frames
    ///
    /// # Errors
    ///
    /// Returns `RepetError::InvalidInput` if any frame does not hold
    /// `n_fft / 2 + 1` bins.
    pub fn from_frames(
        frames: Vec<Vec<Complex<f32>>>,
        n_fft: usize,
        hop_length: usize,
    ) -> Result<Self, RepetError> {
        let num_bins = n_fft / 2 + 1;
        if frames.iter().any(|frame| frame.len() != num_bins) {
            return Err(RepetError::InvalidInput(format!(
                "expected {} bins per frame",
                num_bins
            )));
        }

        Ok(Self {
            frames,
            n_fft,
            hop_length,
        })
    }

    /// Number of time frames
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Number of frequency bins per frame (`n_fft / 2 + 1`)
    pub fn num_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// FFT size used for analysis
    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Hop length used for analysis
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Complex frames, time-major
    pub fn frames(&self) -> &[Vec<Complex<f32>>] {
        &self.frames
    }

    /// Magnitude of every time-frequency cell, time-major
    pub fn magnitude(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// Compute the forward short-time Fourier transform
///
/// The signal is zero-padded by `n_fft / 2` on both sides (centered
/// analysis, so frame `t` is centered on sample `t * hop_length`), segmented
/// into frames advanced by `hop_length`, windowed, and zero-padded to `n_fft`
/// where the tail is shorter than a full frame. The frame count is
/// `ceil(signal_length / hop_length)`.
///
/// # Arguments
///
/// * `signal` - Mono input samples
/// * `n_fft` - FFT window size
/// * `hop_length` - Samples between successive frames
/// * `window` - Analysis window of length `n_fft`
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for an empty signal, or
/// `RepetError::InvalidParameter` for a zero FFT size, a hop length outside
/// `(0, n_fft]`, or a window of the wrong length.
pub fn forward(
    signal: &[f32],
    n_fft: usize,
    hop_length: usize,
    window: &[f32],
) -> Result<Spectrogram, RepetError> {
    if signal.is_empty() {
        return Err(RepetError::InvalidInput("empty signal".to_string()));
    }

    if n_fft == 0 {
        return Err(RepetError::InvalidParameter(
            "n_fft must be > 0".to_string(),
        ));
    }

    if hop_length == 0 || hop_length > n_fft {
        return Err(RepetError::InvalidParameter(format!(
            "hop_length ({}) must be in (0, n_fft = {}]",
            hop_length, n_fft
        )));
    }

    if window.len() != n_fft {
        return Err(RepetError::InvalidParameter(format!(
            "window length ({}) must equal n_fft ({})",
            window.len(),
            n_fft
        )));
    }

    let num_frames = signal.len().div_ceil(hop_length);
    let num_bins = n_fft / 2 + 1;

    log::debug!(
        "STFT: {} samples -> {} frames x {} bins (n_fft={}, hop={})",
        signal.len(),
        num_frames,
        num_bins,
        n_fft,
        hop_length
    );

    // Center the analysis: without the half-window lead-in, the first samples
    // are covered only by the edge of the first window and the normalized
    // reconstruction there loses precision
    let pad = n_fft / 2;
    let mut padded = vec![0.0f32; signal.len() + 2 * pad];
    padded[pad..pad + signal.len()].copy_from_slice(signal);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let mut frames = Vec::with_capacity(num_frames);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];

    for t in 0..num_frames {
        let start = t * hop_length;
        let available = (padded.len() - start).min(n_fft);

        for i in 0..available {
            buffer[i] = Complex::new(padded[start + i] * window[i], 0.0);
        }
        for slot in buffer.iter_mut().take(n_fft).skip(available) {
            *slot = Complex::new(0.0, 0.0);
        }

        fft.process(&mut buffer);
        frames.push(buffer[..num_bins].to_vec());
    }

    Spectrogram::from_frames(frames, n_fft, hop_length)
}

/// Compute the inverse short-time Fourier transform
///
/// Frames are inverse-transformed, windowed again, and overlap-added; every
/// output sample is normalized by the accumulated sum of squared window
/// weights at that position, and the `n_fft / 2` centering lead-in added by
/// [`forward`] is dropped. For hop lengths of `n_fft / 4` and below with a
/// Hann window, `inverse(forward(x))` reconstructs `x` to within numerical
/// tolerance over the full extent, first samples included.
///
/// The output length is `(num_frames - 1) * hop + n_fft - n_fft / 2`; callers
/// trim or pad to the original sample count.
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for an empty spectrogram, or
/// `RepetError::InvalidParameter` for a window that does not match the
/// spectrogram's FFT size.
pub fn inverse(spectrogram: &Spectrogram, window: &[f32]) -> Result<Vec<f32>, RepetError> {
    if spectrogram.num_frames() == 0 {
        return Err(RepetError::InvalidInput("empty spectrogram".to_string()));
    }

    let n_fft = spectrogram.n_fft();
    let hop_length = spectrogram.hop_length();
    let num_bins = spectrogram.num_bins();

    if window.len() != n_fft {
        return Err(RepetError::InvalidParameter(format!(
            "window length ({}) must equal n_fft ({})",
            window.len(),
            n_fft
        )));
    }

    let num_frames = spectrogram.num_frames();
    let output_len = (num_frames - 1) * hop_length + n_fft;

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(n_fft);

    let mut output = vec![0.0f32; output_len];
    let mut window_sum = vec![0.0f32; output_len];
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];
    let scale = 1.0 / n_fft as f32;

    for (t, frame) in spectrogram.frames().iter().enumerate() {
        // Rebuild the full conjugate-symmetric spectrum from the stored half
        buffer[..num_bins].copy_from_slice(frame);
        for k in num_bins..n_fft {
            buffer[k] = frame[n_fft - k].conj();
        }

        ifft.process(&mut buffer);

        let start = t * hop_length;
        for i in 0..n_fft {
            let sample = buffer[i].re * scale;
            output[start + i] += sample * window[i];
            window_sum[start + i] += window[i] * window[i];
        }
    }

    for (sample, &wsum) in output.iter_mut().zip(window_sum.iter()) {
        if wsum > WINDOW_SUM_EPSILON {
            *sample /= wsum;
        }
    }

    // Drop the centering lead-in added by the forward transform
    Ok(output.split_off(n_fft / 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::window::hann_window;

    fn sine(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (std::f32::consts::TAU * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn test_forward_frame_count_invariant() {
        let signal = sine(440.0, 22050, 10_000);
        let window = hann_window(1024);
        let spec = forward(&signal, 1024, 256, &window).unwrap();

        // ceil(10000 / 256) = 40
        assert_eq!(spec.num_frames(), 40);
        assert_eq!(spec.num_bins(), 513);
    }

    #[test]
    fn test_forward_rejects_bad_parameters() {
        let signal = sine(440.0, 22050, 1000);
        let window = hann_window(1024);

        assert!(forward(&[], 1024, 256, &window).is_err());
        assert!(forward(&signal, 1024, 0, &window).is_err());
        assert!(forward(&signal, 1024, 2048, &window).is_err());
        assert!(forward(&signal, 512, 128, &window).is_err()); // window mismatch
    }

    #[test]
    fn test_round_trip_reconstruction() {
        let sample_rate = 22050;
        let signal = sine(440.0, sample_rate, 22050);
        let n_fft = 1024;
        let hop = n_fft / 4;
        let window = hann_window(n_fft);

        let spec = forward(&signal, n_fft, hop, &window).unwrap();
        let reconstructed = inverse(&spec, &window).unwrap();

        assert!(reconstructed.len() >= signal.len());

        let mut err_energy = 0.0f64;
        let mut sig_energy = 0.0f64;
        for i in 0..signal.len() {
            let e = (reconstructed[i] - signal[i]) as f64;
            err_energy += e * e;
            sig_energy += (signal[i] as f64) * (signal[i] as f64);
        }

        // Normalized error below -60 dB
        assert!(
            err_energy / sig_energy < 1e-6,
            "round-trip error too large: {:.3e}",
            err_energy / sig_energy
        );
    }

    #[test]
    fn test_round_trip_head_region() {
        // Cosine: full amplitude at sample 0, the hardest spot for
        // overlap-add coverage
        let sample_rate = 22050u32;
        let n_fft = 1024;
        let hop = n_fft / 4;
        let signal: Vec<f32> = (0..22050)
            .map(|i| (std::f32::consts::TAU * 440.0 * i as f32 / sample_rate as f32).cos() * 0.5)
            .collect();
        let window = hann_window(n_fft);

        let spec = forward(&signal, n_fft, hop, &window).unwrap();
        let reconstructed = inverse(&spec, &window).unwrap();

        let mut err_energy = 0.0f64;
        let mut sig_energy = 0.0f64;
        for i in 0..n_fft {
            let e = (reconstructed[i] - signal[i]) as f64;
            err_energy += e * e;
            sig_energy += (signal[i] as f64) * (signal[i] as f64);
        }
        assert!(
            err_energy / sig_energy < 1e-6,
            "head-region error too large: {:.3e}",
            err_energy / sig_energy
        );
    }

    #[test]
    fn test_round_trip_non_power_of_two_length() {
        let signal = sine(523.25, 22050, 12_345);
        let window = hann_window(2048);

        let spec = forward(&signal, 2048, 512, &window).unwrap();
        let reconstructed = inverse(&spec, &window).unwrap();

        let mut err_energy = 0.0f64;
        let mut sig_energy = 0.0f64;
        for i in 0..signal.len() {
            let e = (reconstructed[i] - signal[i]) as f64;
            err_energy += e * e;
            sig_energy += (signal[i] as f64) * (signal[i] as f64);
        }
        assert!(err_energy / sig_energy < 1e-6);
    }

    #[test]
    fn test_inverse_of_silence_is_silence() {
        let signal = vec![0.0f32; 4096];
        let window = hann_window(1024);

        let spec = forward(&signal, 1024, 256, &window).unwrap();
        let reconstructed = inverse(&spec, &window).unwrap();

        assert!(reconstructed.iter().all(|&x| x.abs() < 1e-7));
    }

    #[test]
    fn test_magnitude_shape() {
        let signal = sine(440.0, 22050, 5000);
        let window = hann_window(512);
        let spec = forward(&signal, 512, 128, &window).unwrap();

        let magnitude = spec.magnitude();
        assert_eq!(magnitude.len(), spec.num_frames());
        assert_eq!(magnitude[0].len(), spec.num_bins());
        assert!(magnitude.iter().flatten().all(|&m| m >= 0.0));
    }
}
