//! `serialport`-backed sensor link.

use std::time::Duration;

use log::debug;
use serialport::SerialPort;

use crate::{config::MonitorConfig, error::ProtocolError, frame::Connect};

/// Opens the configured port once per cycle.
#[derive(Debug, Clone)]
pub struct SerialConnector {
    port: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialConnector {
    pub fn new(port: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            timeout,
        }
    }

    pub fn from_config(cfg: &MonitorConfig) -> Self {
        Self::new(cfg.port.clone(), cfg.baud_rate, cfg.read_timeout())
    }

    pub fn port(&self) -> &str {
        &self.port
    }
}

impl Connect for SerialConnector {
    type Link = Box<dyn SerialPort>;

    fn open(&mut self) -> Result<Self::Link, ProtocolError> {
        debug!("opening {} @ {} baud", self.port, self.baud_rate);
        serialport::new(self.port.as_str(), self.baud_rate)
            .timeout(self.timeout)
            .open()
            .map_err(|e| ProtocolError::Open {
                port: self.port.clone(),
                reason: e.to_string(),
            })
    }
}
