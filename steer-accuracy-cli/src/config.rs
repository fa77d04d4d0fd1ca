//! Configuration loading and parsing
//!
//! Everything here is optional; a missing file or table falls back to the
//! defaults the monitor has always used.

use crate::gate::DEFAULT_SETTLE_SAMPLES;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use steer_telemetry::BusConfig;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GateConfig {
    /// Qualifying samples required before collection starts
    #[serde(default = "default_settle_samples")]
    pub settle_samples: u32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            settle_samples: default_settle_samples(),
        }
    }
}

fn default_settle_samples() -> u32 {
    DEFAULT_SETTLE_SAMPLES
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Redraw after this many heartbeats
    #[serde(default = "default_render_every")]
    pub render_every: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            render_every: default_render_every(),
        }
    }
}

fn default_render_every() -> u64 {
    100
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate(&config).with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.display.render_every == 0 {
        bail!("display.render_every must be at least 1");
    }
    if config.bus.max_frame_bytes == 0 {
        bail!("bus.max_frame_bytes must be at least 1");
    }
    Ok(())
}
