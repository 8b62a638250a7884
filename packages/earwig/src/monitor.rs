//! Monitor session: the acquisition → inference → smoothing → report loop.
//!
//! All per-process state (model, labels, score window, cycle counter) lives in
//! one [`Session`] built at startup. A cycle either completes and reports, or
//! is rejected as a whole before it touches the score window.

use std::{io::Write, time::Duration};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info, warn};

use crate::{
    config::ErrorPolicy,
    constants::DEFAULT_PERIOD_MS,
    error::{ConfigError, MonitorError},
    frame::{FrameNormalizer, FrameSource, NormalizedFrame},
    inference::InferenceEngine,
    labels::ClassLabels,
    reporter::Reporter,
    smoother::{Prediction, TemporalSmoother},
};

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Reported(Prediction),
    /// Frame rejected; history unchanged.
    Skipped { reason: String },
}

pub struct Session<S: FrameSource, W: Write> {
    source: S,
    engine: InferenceEngine,
    labels: ClassLabels,
    smoother: TemporalSmoother,
    reporter: Reporter<W>,

    policy: ErrorPolicy,
    period: Duration,
    max_cycles: Option<u64>,

    cycle: u64,
}

impl<S: FrameSource, W: Write> Session<S, W> {
    /// Assemble a session, checking the label count against the model.
    pub fn new(
        source: S,
        engine: InferenceEngine,
        labels: ClassLabels,
        reporter: Reporter<W>,
    ) -> Result<Self, MonitorError> {
        let outputs = engine.probe()?;
        if outputs != labels.len() {
            return Err(ConfigError::ClassCountMismatch {
                labels: labels.len(),
                outputs,
            }
            .into());
        }

        Ok(Self {
            source,
            engine,
            smoother: TemporalSmoother::new(labels.len()),
            labels,
            reporter,
            policy: ErrorPolicy::default(),
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
            max_cycles: None,
            cycle: 0,
        })
    }

    /* ───────────── fluent setters (chain-able) ───────────── */

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }
    pub fn with_max_cycles(mut self, max: Option<u64>) -> Self {
        self.max_cycles = max;
        self
    }

    /* ───────────────────────── cycle ────────────────────────── */

    /// Acquire, classify, smooth and report one frame.
    ///
    /// Protocol errors follow the session's [`ErrorPolicy`]; degenerate
    /// frames are always skipped; inference and report failures are fatal.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome, MonitorError> {
        let raw = match self.source.read_frame() {
            Ok(raw) => raw,
            Err(e) if self.policy == ErrorPolicy::Skip => {
                warn!("skipping cycle: {e}");
                return Ok(CycleOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let values = match FrameNormalizer::standardize(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("skipping cycle: {e}");
                return Ok(CycleOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
        };

        let batch = NormalizedFrame::from_values(values)?.split()?;
        let rows = self.engine.score(&batch)?;
        let prediction = self.smoother.update(&rows)?;
        debug!("cycle {}: winner index {}", self.cycle, prediction.winner);

        self.reporter
            .report(self.cycle, &self.labels, &prediction)
            .map_err(MonitorError::Report)?;
        self.cycle += 1;

        Ok(CycleOutcome::Reported(prediction))
    }

    /// Run until `cancel` fires, its sender disconnects, or `max_cycles`
    /// ticks have elapsed.
    ///
    /// The inter-cycle pause doubles as the cancellation check, so a cycle is
    /// never interrupted mid-frame. Returns the number of reported cycles.
    pub fn run(&mut self, cancel: &Receiver<()>) -> Result<u64, MonitorError> {
        let mut ticks = 0u64;
        loop {
            if self.max_cycles.is_some_and(|max| ticks >= max) {
                info!("reached {ticks} cycles, stopping");
                break;
            }

            match cancel.recv_timeout(self.period) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    info!("cancelled after {} reported cycles", self.cycle);
                    break;
                }
            }

            self.run_cycle()?;
            ticks += 1;
        }
        Ok(self.cycle)
    }

    /* ───────────────────────── accessors ────────────────────── */

    /// Reported cycles so far (the next report's counter).
    pub fn cycles_reported(&self) -> u64 {
        self.cycle
    }

    pub fn smoother(&self) -> &TemporalSmoother {
        &self.smoother
    }

    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    pub fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
