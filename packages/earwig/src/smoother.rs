//! Temporal smoothing of per-sub-frame scores.
//!
//! The smoother keeps the last [`HISTORY_DEPTH`] score rows (three cycles of
//! three sub-frames). Each update shifts out the oldest [`SUB_FRAMES`] rows,
//! appends the new batch in sub-frame order, and reports the per-class mean
//! over the whole window. History starts zeroed, so the first two cycles are
//! diluted by the empty slots.

use crate::{
    constants::{HISTORY_DEPTH, SUB_FRAMES},
    error::InferenceError,
    inference::ScoreRow,
};

/// Smoothed per-class means and the winning class.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub means: Vec<f32>,
    /// Index of the highest mean; ties go to the lowest index.
    pub winner: usize,
}

impl Prediction {
    pub fn from_means(means: Vec<f32>) -> Self {
        let mut winner = 0;
        for (i, &m) in means.iter().enumerate().skip(1) {
            if m > means[winner] {
                winner = i;
            }
        }
        Self { means, winner }
    }

    /// Mean score of the winning class.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.means.get(self.winner).copied().unwrap_or(0.0)
    }
}

/// Sliding window of score rows, owned by the session.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    history: Vec<ScoreRow>,
    classes: usize,
}

impl TemporalSmoother {
    pub fn new(classes: usize) -> Self {
        Self {
            history: vec![vec![0.0; classes]; HISTORY_DEPTH],
            classes,
        }
    }

    /// Shift in one cycle's batch and return the new prediction.
    ///
    /// The batch is validated in full before the window moves, so a rejected
    /// batch leaves history exactly as it was.
    pub fn update(&mut self, batch: &[ScoreRow]) -> Result<Prediction, InferenceError> {
        if batch.len() != SUB_FRAMES {
            return Err(InferenceError::BatchMismatch {
                expected: SUB_FRAMES,
                actual: batch.len(),
            });
        }
        if let Some(row) = batch.iter().find(|r| r.len() != self.classes) {
            return Err(InferenceError::ClassCountMismatch {
                expected: self.classes,
                actual: row.len(),
            });
        }

        self.history.rotate_left(SUB_FRAMES);
        for (slot, row) in self.history[HISTORY_DEPTH - SUB_FRAMES..]
            .iter_mut()
            .zip(batch)
        {
            slot.copy_from_slice(row);
        }

        Ok(self.prediction())
    }

    /// Prediction over the current window.
    pub fn prediction(&self) -> Prediction {
        let mut sums = vec![0f64; self.classes];
        for row in &self.history {
            for (s, &v) in sums.iter_mut().zip(row) {
                *s += f64::from(v);
            }
        }
        let depth = HISTORY_DEPTH as f64;
        Prediction::from_means(sums.into_iter().map(|s| (s / depth) as f32).collect())
    }

    /// Window rows, oldest first.
    pub fn history(&self) -> &[ScoreRow] {
        &self.history
    }
}
