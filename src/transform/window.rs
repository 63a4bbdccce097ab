//! Analysis window generation

/// Generate a periodic Hann window of the given size
///
/// The periodic form (`0.5 * (1 - cos(2*pi*i / size))`) satisfies the
/// constant-overlap-add condition for hop sizes of `size / 4` and below,
/// which the inverse transform relies on for artifact-free reconstruction.
///
/// # Arguments
///
/// * `size` - Window length in samples
///
/// # Returns
///
/// Window coefficients in [0, 1]
pub fn hann_window(size: usize) -> Vec<f32> {
    if size == 0 {
        return vec![];
    }

    (0..size)
        .map(|i| {
            let omega = std::f32::consts::TAU / size as f32;
            0.5 * (1.0 - (omega * i as f32).cos())
        })
        .collect()
}
