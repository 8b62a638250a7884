//! Earwig – public crate root
//! ==========================
//! Live **acoustic event** monitor: mel frames arrive over a serial link, a
//! pretrained convolutional classifier scores them, and a sliding window
//! smooths the scores into one label per cycle.
//!
//! Pipeline, once per tick:
//!
//! 1. [`frame::FrameReader`] triggers the sensor and parses one 200×40 frame.
//! 2. [`frame::FrameNormalizer`] standardises it over the whole frame.
//! 3. [`frame::NormalizedFrame::split`] cuts three 64-step sub-frames.
//! 4. [`inference::InferenceEngine`] scores each sub-frame.
//! 5. [`smoother::TemporalSmoother`] averages the last nine score rows.
//! 6. [`reporter::Reporter`] prints the winner and the score table.
//!
//! [`monitor::Session`] owns all of it and drives the loop.
#![deny(unsafe_code)]

/* ────────────────────────  sub-modules  ─────────────────────────────── */
pub mod config;
pub mod constants;
pub mod error;
pub mod frame;
pub mod inference;
pub mod labels;
pub mod monitor;
pub mod reporter;
pub mod serial;
pub mod smoother;

/* ────────────────────────── public façade ───────────────────────────── */
pub use config::{ErrorPolicy, MonitorConfig};
pub use error::{ConfigError, InferenceError, MonitorError, NormalizationError, ProtocolError};
pub use frame::{Connect, FrameReader, FrameSource, RawFrame};
pub use inference::{ActivationModel, InferenceEngine, ScoreRow};
#[cfg(feature = "onnx")]
pub use inference::OnnxActivationModel;
pub use labels::ClassLabels;
pub use monitor::{CycleOutcome, Session};
pub use reporter::Reporter;
pub use serial::SerialConnector;
pub use smoother::{Prediction, TemporalSmoother};
