//! Inference engine.
//!
//! The classifier is queried as a multi-output graph: every exposed layer
//! output comes back, in graph order, and only the last one (the classifier
//! head) is turned into scores.

use candle_core::{DType, Tensor};
use log::debug;

use crate::{
    constants::SCORE_SCALE,
    error::InferenceError,
    frame::SubFrameBatch,
};

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxActivationModel;

/// Per-class pseudo-percentages for one sub-frame (raw activation × 100).
pub type ScoreRow = Vec<f32>;

/// A pretrained network that exposes all of its layer outputs.
pub trait ActivationModel {
    /// Run `batch` through the network.
    ///
    /// Returns every exposed layer output in graph order; the last entry is
    /// the classifier head with shape `(batch, classes)`.
    fn activations(&self, batch: &Tensor) -> Result<Vec<Tensor>, InferenceError>;
}

impl<M: ActivationModel + ?Sized> ActivationModel for Box<M> {
    fn activations(&self, batch: &Tensor) -> Result<Vec<Tensor>, InferenceError> {
        (**self).activations(batch)
    }
}

pub struct InferenceEngine {
    model: Box<dyn ActivationModel>,
}

impl InferenceEngine {
    pub fn new(model: Box<dyn ActivationModel>) -> Self {
        Self { model }
    }

    /// Score every sub-frame in `batch`, one [`ScoreRow`] each, in batch order.
    pub fn score(&self, batch: &SubFrameBatch) -> Result<Vec<ScoreRow>, InferenceError> {
        let mut layers = self.model.activations(batch.tensor())?;
        debug!("model exposed {} layer outputs", layers.len());

        let head = layers.pop().ok_or(InferenceError::NoActivations)?;
        let rows = head
            .to_dtype(DType::F32)?
            .flatten_from(1)?
            .affine(SCORE_SCALE, 0.0)?
            .to_vec2::<f32>()?;

        if rows.len() != batch.len() {
            return Err(InferenceError::BatchMismatch {
                expected: batch.len(),
                actual: rows.len(),
            });
        }
        Ok(rows)
    }

    /// Output width of the classifier head, measured on an all-zero batch.
    pub fn probe(&self) -> Result<usize, InferenceError> {
        let rows = self.score(&SubFrameBatch::zeros()?)?;
        Ok(rows.first().map_or(0, Vec::len))
    }
}
