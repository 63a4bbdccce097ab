//! # REPET DSP
//!
//! Music source separation and pitch shifting. The separation pipeline
//! implements the REpeating Pattern Extraction Technique (REPET): the
//! repeating background (instrumental) of a mixture is estimated from the
//! periodicity of its magnitude spectrogram and split from the non-repeating
//! foreground (vocals) with complementary soft masks. A phase-vocoder pitch
//! shifter with an autocorrelation pitch detector handles the shifted-vocal
//! path.
//!
//! ## Quick Start
//!
//! ```no_run
//! use repet_dsp::{separate_audio, SeparationConfig};
//!
//! // Mono samples, normalized to [-1.0, 1.0]
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let sample_rate = 22050;
//!
//! let result = separate_audio(&samples, sample_rate, SeparationConfig::default())?;
//!
//! println!(
//!     "period: {} frames ({:.2} s)",
//!     result.metadata.period_frames, result.metadata.period_seconds
//! );
//! # Ok::<(), repet_dsp::RepetError>(())
//! ```
//!
//! ## Architecture
//!
//! The separation pipeline follows this flow:
//!
//! ```text
//! Signal → STFT → Beat Spectrum → Period → Median Template → Soft Masks → ISTFT
//! ```
//!
//! Pitch shifting is independent:
//!
//! ```text
//! Signal (+ optional reference) → Pitch Detection → Phase Vocoder → Resample
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod pitch;
pub mod result;
pub mod separation;
pub mod transform;

// Re-export main types
pub use config::{PitchShiftConfig, SeparationConfig};
pub use error::RepetError;
pub use result::{SeparationMetadata, SeparationResult};

use separation::{beat_spectrum::beat_spectrum, mask, pattern, period, synthesis, PeriodEstimate};
use transform::{forward, hann_window};

/// How the pitch shift amount is specified
///
/// Exactly one mode is supplied by construction: either a direct semitone
/// delta, or a target frequency paired with a reference buffer whose detected
/// pitch defines the source frequency.
#[derive(Debug, Clone)]
pub enum PitchShiftRequest<'a> {
    /// Signed semitone delta (one semitone = frequency ratio 2^(1/12))
    Semitones(f32),

    /// Shift so the reference's detected pitch lands on `target_hz`
    TargetFrequency {
        /// Target fundamental frequency in Hz
        target_hz: f32,
        /// Reference buffer used to estimate the source pitch
        reference: &'a [f32],
    },
}

/// Separate a mixture into vocal and instrumental components
///
/// Runs the full REPET pipeline: STFT, beat-spectrum period detection (with
/// graceful fallback), median repeating-pattern extraction, soft masking, and
/// masked resynthesis. Both output signals have exactly the input's sample
/// count and sample rate.
///
/// # Arguments
///
/// * `samples` - Mono audio samples, normalized to [-1.0, 1.0]
/// * `sample_rate` - Sample rate in Hz
/// * `config` - Separation configuration parameters
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for an empty signal or zero sample
/// rate, and `RepetError::InvalidParameter` for inconsistent transform
/// parameters. Detection failures do not abort the pipeline; the configured
/// fallback period is used and reported in the metadata.
///
/// # Example
///
/// ```no_run
/// use repet_dsp::{separate_audio, SeparationConfig};
///
/// let samples = vec![0.0f32; 22050 * 10];
/// let result = separate_audio(&samples, 22050, SeparationConfig::default())?;
/// assert_eq!(result.vocal.len(), samples.len());
/// # Ok::<(), repet_dsp::RepetError>(())
/// ```
pub fn separate_audio(
    samples: &[f32],
    sample_rate: u32,
    config: SeparationConfig,
) -> Result<SeparationResult, RepetError> {
    use std::time::Instant;
    let start_time = Instant::now();

    if samples.is_empty() {
        return Err(RepetError::InvalidInput("empty audio samples".to_string()));
    }

    if sample_rate == 0 {
        return Err(RepetError::InvalidInput("invalid sample rate".to_string()));
    }

    config.validate()?;

    log::debug!(
        "Starting separation: {} samples at {} Hz",
        samples.len(),
        sample_rate
    );

    // Stage 1: forward transform
    let window = hann_window(config.n_fft);
    let spectrogram = forward(samples, config.n_fft, config.hop_length, &window)?;
    let magnitude = spectrogram.magnitude();

    // Stage 2: repeating-period detection
    let estimate = if spectrogram.num_frames() < 2 {
        // Too short for a beat spectrum; degrade to a one-frame period
        log::warn!("Signal shorter than two frames; skipping period detection");
        PeriodEstimate {
            frames: 1,
            score: 0.0,
            from_fallback: true,
        }
    } else {
        let spectrum = beat_spectrum(&magnitude)?;
        period::estimate_period(&spectrum, sample_rate, &config)
    };

    // Stage 3: repeating-pattern template, tiled to the full extent
    let template = pattern::extract_template(&magnitude, estimate.frames);
    let repeating = pattern::tile_template(&template, spectrogram.num_frames());

    // Stage 4: complementary soft masks
    let (instrumental_mask, vocal_mask) = mask::soft_masks(&magnitude, &repeating);

    // Stage 5: masked resynthesis at the original sample count
    let instrumental =
        synthesis::resynthesize(&spectrogram, &instrumental_mask, &window, samples.len())?;
    let vocal = synthesis::resynthesize(&spectrogram, &vocal_mask, &window, samples.len())?;

    let period_seconds = estimate.frames as f32 * config.hop_length as f32 / sample_rate as f32;
    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    log::debug!(
        "Separation complete in {:.1} ms (period {} frames, {:.2} s)",
        processing_time_ms,
        estimate.frames,
        period_seconds
    );

    Ok(SeparationResult {
        vocal,
        instrumental,
        sample_rate,
        metadata: SeparationMetadata {
            duration_seconds: samples.len() as f32 / sample_rate as f32,
            processing_time_ms,
            period_frames: estimate.frames,
            period_seconds,
            period_from_fallback: estimate.from_fallback,
        },
    })
}

/// Pitch-shift a signal while preserving its duration
///
/// In semitone mode the shift is applied directly. In target-frequency mode
/// the reference buffer's pitch is detected first and the shift is
/// `12 * log2(target / detected)`; a pitch-detection failure aborts only this
/// mode and is surfaced as `RepetError::DetectionFailure`.
///
/// # Arguments
///
/// * `samples` - Mono audio samples to shift
/// * `sample_rate` - Sample rate in Hz
/// * `request` - Shift mode (semitone delta or target frequency)
/// * `config` - Detector band, thresholds, and phase-vocoder FFT size
///
/// # Errors
///
/// Returns `RepetError::InvalidInput` for empty buffers or a zero sample
/// rate, `RepetError::InvalidParameter` for a non-positive target frequency
/// or invalid configuration, and `RepetError::DetectionFailure` when the
/// reference pitch cannot be detected.
pub fn pitch_shift_audio(
    samples: &[f32],
    sample_rate: u32,
    request: &PitchShiftRequest<'_>,
    config: &PitchShiftConfig,
) -> Result<Vec<f32>, RepetError> {
    if samples.is_empty() {
        return Err(RepetError::InvalidInput("empty audio samples".to_string()));
    }

    if sample_rate == 0 {
        return Err(RepetError::InvalidInput("invalid sample rate".to_string()));
    }

    config.validate()?;

    let semitones = match request {
        PitchShiftRequest::Semitones(semitones) => *semitones,
        PitchShiftRequest::TargetFrequency {
            target_hz,
            reference,
        } => {
            if *target_hz <= 0.0 {
                return Err(RepetError::InvalidParameter(format!(
                    "target frequency must be > 0, got {:.2}",
                    target_hz
                )));
            }

            let detected = pitch::detect_pitch(reference, sample_rate, config)?;
            let semitones = pitch::semitones_from_frequencies(detected, *target_hz);
            log::debug!(
                "Target-pitch mode: {:.2} Hz -> {:.2} Hz ({:+.2} semitones)",
                detected,
                target_hz,
                semitones
            );
            semitones
        }
    };

    pitch::pitch_shift_semitones(samples, semitones, config.n_fft)
}
