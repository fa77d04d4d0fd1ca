//! Bus client configuration types
//!
//! This module defines the minimal configuration needed to reach the
//! telemetry bus. Statistics, display and gating settings live in the
//! application layer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Address that selects the local IPC transport
pub const DEFAULT_ADDR: &str = "127.0.0.1";

/// Configuration for the bus client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Unix domain socket used by the local transport
    #[serde(default = "default_ipc_path")]
    pub ipc_path: PathBuf,

    /// TCP port used by the network transport
    #[serde(default = "default_port")]
    pub port: u16,

    /// Read timeout in milliseconds (bounds how long a poll may block)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Largest accepted frame payload in bytes
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_ipc_path() -> PathBuf {
    PathBuf::from("/tmp/steer_telemetry.sock")
}

fn default_port() -> u16 {
    8023
}

fn default_poll_interval() -> u64 {
    100
}

fn default_max_frame_bytes() -> usize {
    1024 * 1024
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            ipc_path: default_ipc_path(),
            port: default_port(),
            poll_interval_ms: default_poll_interval(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl BusConfig {
    /// Create a new bus configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the IPC socket path
    pub fn with_ipc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ipc_path = path.into();
        self
    }

    /// Builder method: set the TCP port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Builder method: set the poll interval in milliseconds
    pub fn with_poll_interval_ms(mut self, millis: u64) -> Self {
        self.poll_interval_ms = millis;
        self
    }

    /// Builder method: set the frame size limit
    pub fn with_max_frame_bytes(mut self, limit: usize) -> Self {
        self.max_frame_bytes = limit;
        self
    }

    /// Read timeout applied to the transport. A zero interval would disable
    /// timeouts entirely, so it is clamped to one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
