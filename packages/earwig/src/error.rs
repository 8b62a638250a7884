//! Error taxonomy for the monitor pipeline.
//!
//! Each stage owns one enum; [`MonitorError`] is what a cycle returns when a
//! failure is not absorbed by the session's error policy.

use std::path::PathBuf;

use thiserror::Error;

/* --------------------------------------------------------------------- */
/*  Serial acquisition                                                   */

/// Malformed, truncated or unreadable serial frame.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("cannot open serial port '{port}': {reason}")]
    Open { port: String, reason: String },
    #[error("serial io: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: not ASCII")]
    NonAscii { line: usize },
    #[error("line {line}: no framing character before line end")]
    MissingSentinel { line: usize },
    #[error("line {line}: invalid integer token '{token}'")]
    InvalidToken { line: usize, token: String },
    #[error("link closed after {received} values, before end of frame")]
    UnexpectedEof { received: usize },
    #[error("frame exceeded {expected} values before end of frame")]
    Overflow { expected: usize },
    #[error("frame holds {actual} values, expected {expected}")]
    FrameLength { expected: usize, actual: usize },
}

/* --------------------------------------------------------------------- */
/*  Normalisation                                                        */

#[derive(Debug, Error, PartialEq)]
pub enum NormalizationError {
    #[error("cannot standardise an empty frame")]
    EmptyFrame,
    #[error("frame has zero variance (constant value {mean})")]
    ZeroVariance { mean: f64 },
}

/* --------------------------------------------------------------------- */
/*  Inference                                                            */

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("candle: {0}")]
    Candle(#[from] candle_core::Error),
    #[error("model returned no layer outputs")]
    NoActivations,
    #[error("model returned {actual} score rows, expected {expected}")]
    BatchMismatch { expected: usize, actual: usize },
    #[error("layer output '{0}' missing from evaluation")]
    MissingOutput(String),
    #[error("score row has {actual} classes, expected {expected}")]
    ClassCountMismatch { expected: usize, actual: usize },
}

/* --------------------------------------------------------------------- */
/*  Startup                                                              */

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("label file {}: {reason}", path.display())]
    Labels { path: PathBuf, reason: String },
    #[error("label file defines no classes")]
    EmptyLabels,
    #[error("label indices must be contiguous from 0; index {missing} is missing")]
    NonContiguousLabels { missing: usize },
    #[error("model {}: {reason}", path.display())]
    Model { path: PathBuf, reason: String },
    #[error("label file names {labels} classes but the model scores {outputs}")]
    ClassCountMismatch { labels: usize, outputs: usize },
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/* --------------------------------------------------------------------- */
/*  Session                                                              */

/// Failure that ends the monitor loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("tensor: {0}")]
    Tensor(#[from] candle_core::Error),
    #[error("report: {0}")]
    Report(std::io::Error),
}
