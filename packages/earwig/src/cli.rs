//! Command line interface for the earwig monitor.
//!
//! Every flag overrides the matching field of the (optional) TOML config.

use clap::Parser;
use std::path::PathBuf;

use earwig::{ConfigError, ErrorPolicy, MonitorConfig};

/// Live acoustic event monitor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Serial device the sensor is attached to
    #[arg(short, long)]
    pub port: Option<String>,

    /// Serial speed
    #[arg(short, long)]
    pub baud_rate: Option<u32>,

    /// ONNX classifier
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// YAML class labels
    #[arg(short, long)]
    pub labels: Option<PathBuf>,

    /// Device-level read timeout in milliseconds
    #[arg(long)]
    pub read_timeout_ms: Option<u64>,

    /// Pause between cycles in milliseconds
    #[arg(long)]
    pub period_ms: Option<u64>,

    /// What to do with a malformed frame (skip, fatal)
    #[arg(long)]
    pub on_protocol_error: Option<ErrorPolicy>,

    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,
}

impl Cli {
    /// Merge the config file (if any) with command line overrides.
    pub fn resolve(&self) -> Result<MonitorConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => MonitorConfig::load(path)?,
            None => MonitorConfig::default(),
        };

        if let Some(port) = &self.port {
            cfg.port = port.clone();
        }
        if let Some(baud) = self.baud_rate {
            cfg.baud_rate = baud;
        }
        if let Some(model) = &self.model {
            cfg.model = model.clone();
        }
        if let Some(labels) = &self.labels {
            cfg.labels = labels.clone();
        }
        if let Some(ms) = self.read_timeout_ms {
            cfg.read_timeout_ms = ms;
        }
        if let Some(ms) = self.period_ms {
            cfg.period_ms = ms;
        }
        if let Some(policy) = self.on_protocol_error {
            cfg.on_protocol_error = policy;
        }
        if self.max_cycles.is_some() {
            cfg.max_cycles = self.max_cycles;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
