//! Soft mask generation
//!
//! Compares the mixture magnitude against the tiled repeating-pattern
//! estimate and produces complementary Wiener-like ratio masks. Where the
//! repeating estimate accounts for the mixture the cell is judged
//! instrumental; excess mixture energy is judged vocal.

/// Regularization epsilon added to the denominator; also the silence cutoff
/// below which a cell's instrumental mask is forced to zero.
const MASK_EPSILON: f32 = 1e-10;

/// Compute complementary soft masks from mixture and repeating magnitudes
///
/// Per cell: `instrumental = clamp(min(repeating, mixture) / mixture, 0, 1)`,
/// with a zero mask wherever the mixture magnitude is numerically silent, and
/// `vocal = 1 - instrumental`. Complementarity holds exactly for every cell.
///
/// # Arguments
///
/// * `mixture` - Mixture magnitude spectrogram, time-major
/// * `repeating` - Tiled repeating-pattern magnitude, same shape
///
/// # Returns
///
/// `(instrumental_mask, vocal_mask)`, each the shape of the inputs with
/// values in [0, 1]
pub fn soft_masks(mixture: &[Vec<f32>], repeating: &[Vec<f32>]) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    debug_assert_eq!(mixture.len(), repeating.len());

    let mut instrumental = Vec::with_capacity(mixture.len());
    let mut vocal = Vec::with_capacity(mixture.len());

    for (mix_frame, rep_frame) in mixture.iter().zip(repeating.iter()) {
        debug_assert_eq!(mix_frame.len(), rep_frame.len());

        let mut inst_frame = Vec::with_capacity(mix_frame.len());
        let mut vocal_frame = Vec::with_capacity(mix_frame.len());

        for (&m, &r) in mix_frame.iter().zip(rep_frame.iter()) {
            let inst = if m <= MASK_EPSILON {
                0.0
            } else {
                (r.min(m) / (m + MASK_EPSILON)).clamp(0.0, 1.0)
            };
            inst_frame.push(inst);
            vocal_frame.push(1.0 - inst);
        }

        instrumental.push(inst_frame);
        vocal.push(vocal_frame);
    }

    (instrumental, vocal)
}
