//! Repeating-period estimation from the beat spectrum
//!
//! Picks the dominant repetition period as the highest beat-spectrum peak
//! inside the configured search band. When no peak clears the threshold the
//! estimate degrades to a configured fallback period instead of failing.

use crate::config::SeparationConfig;

/// Estimated repeating period
#[derive(Debug, Clone, Copy)]
pub struct PeriodEstimate {
    /// Period in frames, always in `[1, num_frames - 1]`
    pub frames: usize,

    /// Beat-spectrum value at the chosen lag, relative to zero lag (0.0-1.0)
    pub score: f32,

    /// True if no peak cleared the threshold and the fallback period was used
    pub from_fallback: bool,
}

/// Estimate the repeating period from a beat spectrum
///
/// Searches lags in `[min_period_frames, max_period_frames]` (derived from the
/// configured seconds bounds, capped at half the frame count) for local maxima
/// exceeding `period_peak_threshold` relative to the zero-lag value. The
/// highest qualifying peak wins; ties break toward the smaller lag.
///
/// # Arguments
///
/// * `spectrum` - Beat spectrum normalized to its zero-lag value
/// * `sample_rate` - Sample rate of the analyzed signal in Hz
/// * `config` - Separation parameters (search band, threshold, fallback)
///
/// # Returns
///
/// A [`PeriodEstimate`]; `from_fallback` is set when detection failed and the
/// fallback period was substituted.
pub fn estimate_period(
    spectrum: &[f32],
    sample_rate: u32,
    config: &SeparationConfig,
) -> PeriodEstimate {
    let num_frames = spectrum.len();
    let frames_per_sec = sample_rate as f32 / config.hop_length as f32;

    let min_lag = ((config.min_period_secs * frames_per_sec).round() as usize).max(1);
    let max_lag = ((config.max_period_secs * frames_per_sec).round() as usize)
        .min(num_frames / 2)
        .min(num_frames.saturating_sub(1));

    let mut best: Option<(usize, f32)> = None;

    if min_lag <= max_lag {
        for lag in min_lag..=max_lag {
            let value = spectrum[lag];
            if value < config.period_peak_threshold {
                continue;
            }

            // Local maximum against the immediate neighbors; ties toward the
            // smaller lag via strict comparison on the running best
            let left = spectrum[lag - 1];
            let right = if lag + 1 < num_frames {
                spectrum[lag + 1]
            } else {
                f32::NEG_INFINITY
            };
            if value < left || value < right {
                continue;
            }

            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((lag, value)),
            }
        }
    }

    if let Some((lag, score)) = best {
        log::debug!(
            "Detected repeating period: {} frames ({:.2} s, score {:.3})",
            lag,
            lag as f32 / frames_per_sec,
            score
        );
        return PeriodEstimate {
            frames: lag,
            score,
            from_fallback: false,
        };
    }

    // Detection failure: degrade to the configured default period
    let fallback = ((config.fallback_period_secs * frames_per_sec).round() as usize)
        .clamp(1, num_frames.saturating_sub(1).max(1));

    log::warn!(
        "No beat-spectrum peak cleared threshold {:.2} in [{}, {}]; \
         falling back to {} frames",
        config.period_peak_threshold,
        min_lag,
        max_lag,
        fallback
    );

    PeriodEstimate {
        frames: fallback,
        score: 0.0,
        from_fallback: true,
    }
}
