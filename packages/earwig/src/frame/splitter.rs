//! Frame reshaping and sub-frame batching.
//!
//! A normalised frame is viewed as `(200, 40, 1)` and cut along the time axis
//! into three non-overlapping 64-step windows starting at steps 0, 64 and 128.
//! Steps 192..200 are never fed to the model.

use candle_core::{DType, Device, Result as CandleResult, Tensor};

use crate::constants::{
    FRAME_CHANNELS, FRAME_LEN, FRAME_STEPS, MEL_BANDS, SUB_FRAME_STEPS, SUB_FRAMES,
};

/// Standardised frame, shape `(FRAME_STEPS, MEL_BANDS, FRAME_CHANNELS)`.
#[derive(Debug, Clone)]
pub struct NormalizedFrame {
    tensor: Tensor,
}

impl NormalizedFrame {
    /// Reshape standardised values into a frame tensor.
    ///
    /// Fails unless `values.len() == FRAME_LEN`.
    pub fn from_values(values: Vec<f32>) -> CandleResult<Self> {
        if values.len() != FRAME_LEN {
            candle_core::bail!("frame holds {} values, expected {FRAME_LEN}", values.len());
        }
        let tensor = Tensor::from_vec(
            values,
            (FRAME_STEPS, MEL_BANDS, FRAME_CHANNELS),
            &Device::Cpu,
        )?;
        Ok(Self { tensor })
    }

    #[inline]
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Cut into the model batch of `SUB_FRAMES` contiguous windows.
    pub fn split(&self) -> CandleResult<SubFrameBatch> {
        let parts = (0..SUB_FRAMES)
            .map(|i| self.tensor.narrow(0, i * SUB_FRAME_STEPS, SUB_FRAME_STEPS))
            .collect::<CandleResult<Vec<_>>>()?;
        Ok(SubFrameBatch {
            tensor: Tensor::stack(&parts, 0)?,
        })
    }
}

/// Model input, shape `(SUB_FRAMES, SUB_FRAME_STEPS, MEL_BANDS, FRAME_CHANNELS)`.
#[derive(Debug, Clone)]
pub struct SubFrameBatch {
    tensor: Tensor,
}

impl SubFrameBatch {
    /// All-zero batch, used to probe the model's output width at startup.
    pub fn zeros() -> CandleResult<Self> {
        let tensor = Tensor::zeros(
            (SUB_FRAMES, SUB_FRAME_STEPS, MEL_BANDS, FRAME_CHANNELS),
            DType::F32,
            &Device::Cpu,
        )?;
        Ok(Self { tensor })
    }

    #[inline]
    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Number of sub-frames (batch elements).
    #[inline]
    pub fn len(&self) -> usize {
        self.tensor.dims().first().copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
