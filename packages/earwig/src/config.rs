//! Monitor configuration.
//!
//! Every field has a default reproducing the sensor rig the monitor was built
//! for, so an empty TOML file (or none at all) is a valid configuration.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    constants::{DEFAULT_BAUD_RATE, DEFAULT_PERIOD_MS, DEFAULT_READ_TIMEOUT_MS},
    error::ConfigError,
};

/// What a cycle does with a malformed or truncated serial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the error and retry on the next tick.
    #[default]
    Skip,
    /// Stop the monitor.
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Serial device path (`/dev/ttyUSB0`, `COM15`, ...).
    pub port: String,
    pub baud_rate: u32,
    /// ONNX classifier.
    pub model: PathBuf,
    /// YAML class labels.
    pub labels: PathBuf,
    pub read_timeout_ms: u64,
    /// Pause between the end of one report and the next acquisition.
    pub period_ms: u64,
    pub on_protocol_error: ErrorPolicy,
    /// Stop after this many ticks; `None` runs until cancelled.
    pub max_cycles: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            model: PathBuf::from("cnn_for_aed.onnx"),
            labels: PathBuf::from("class_labels.yaml"),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            period_ms: DEFAULT_PERIOD_MS,
            on_protocol_error: ErrorPolicy::Skip,
            max_cycles: None,
        }
    }
}

impl MonitorConfig {
    /// Load and validate a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: MonitorConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "port",
                reason: "cannot be empty".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid {
                field: "baud_rate",
                reason: "must be positive".to_string(),
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}
