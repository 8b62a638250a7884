//! Whole-frame standardisation.
//!
//! Every value of a raw frame is rescaled to `(v - µ) / σ`, with µ and σ the
//! mean and *population* standard deviation over the entire frame (not per
//! band). Statistics are accumulated in `f64`; the output is `f32` because
//! that is what the model consumes.

use crate::error::NormalizationError;

/// Stateless helper for frame standardisation.
pub struct FrameNormalizer;

impl FrameNormalizer {
    /// Standardise `raw` to zero mean and unit variance.
    ///
    /// A constant frame has no variance to scale by and yields
    /// [`NormalizationError::ZeroVariance`]; the caller decides whether that
    /// skips the cycle.
    pub fn standardize(raw: &[i32]) -> Result<Vec<f32>, NormalizationError> {
        if raw.is_empty() {
            return Err(NormalizationError::EmptyFrame);
        }

        let n = raw.len() as f64;
        let mean = raw.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        let var = raw
            .iter()
            .map(|&v| {
                let d = f64::from(v) - mean;
                d * d
            })
            .sum::<f64>()
            / n;

        if var <= 0.0 {
            return Err(NormalizationError::ZeroVariance { mean });
        }

        let inv_std = 1.0 / var.sqrt();
        Ok(raw
            .iter()
            .map(|&v| ((f64::from(v) - mean) * inv_std) as f32)
            .collect())
    }
}
