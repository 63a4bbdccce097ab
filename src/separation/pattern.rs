//! Repeating-pattern template extraction
//!
//! Builds a one-period magnitude template by taking the per-bin median across
//! period-aligned windows, then tiles it back over the full time extent. The
//! median suppresses magnitudes contributed by non-repeating content, so the
//! template captures the repeating (instrumental) layer.

/// Extract the repeating-pattern template for a known period
///
/// The time axis is partitioned into consecutive windows of `period` frames;
/// a trailing partial window is dropped from aggregation. For every position
/// inside the period and every frequency bin, the template value is the
/// median magnitude across all complete windows.
///
/// # Arguments
///
/// * `magnitude` - Magnitude spectrogram, time-major
/// * `period` - Repeating period in frames, `1 <= period <= num_frames`
///
/// # Returns
///
/// Template of shape `(period, num_bins)`, time-major like the input
pub fn extract_template(magnitude: &[Vec<f32>], period: usize) -> Vec<Vec<f32>> {
    let num_frames = magnitude.len();
    let num_bins = magnitude.first().map_or(0, |f| f.len());
    let period = period.clamp(1, num_frames.max(1));
    let num_windows = num_frames / period;

    log::debug!(
        "Extracting repeating template: period {} frames, {} complete windows",
        period,
        num_windows
    );

    if num_windows == 0 {
        // Period longer than the signal: the whole spectrogram is the template
        return magnitude.to_vec();
    }

    let mut template = vec![vec![0.0f32; num_bins]; period];
    let mut values = Vec::with_capacity(num_windows);

    for phase in 0..period {
        for bin in 0..num_bins {
            values.clear();
            for window in 0..num_windows {
                values.push(magnitude[window * period + phase][bin]);
            }
            template[phase][bin] = median(&mut values);
        }
    }

    template
}

/// Tile a template cyclically to cover `num_frames` frames
///
/// Phase 0 of the template aligns with frame 0; a final partial tile is
/// truncated to the remaining frame count.
pub fn tile_template(template: &[Vec<f32>], num_frames: usize) -> Vec<Vec<f32>> {
    let period = template.len();
    if period == 0 {
        return vec![];
    }

    (0..num_frames)
        .map(|t| template[t % period].clone())
        .collect()
}

/// Median of a slice, averaging the two middle values for even lengths
///
/// Sorts in place; NaN-free input is assumed (magnitudes are finite and
/// nonnegative).
fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        0.5 * (values[mid - 1] + values[mid])
    }
}
