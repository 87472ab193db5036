//! System configuration parameters
//!
//! All tunable parameters for the cell controller, loaded once at startup
//! from a YAML file.  Missing keys fall back to [`SystemConfig::default`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::io_map::{ChannelSpec, IoMap};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop tick period (milliseconds)
    pub loop_ms: u32,
    /// Minimum gap between two accepted object edges (milliseconds)
    pub debounce_obj_ms: u32,
    /// Handshake pulse width (milliseconds)
    pub pulse_ms: u32,
    /// Heartbeat toggle period (milliseconds)
    pub heartbeat_ms: u32,

    // --- Production ---
    /// Objects per marking batch
    pub batch_size: u32,
    /// Target shown before the operator arms one
    pub target_default: u32,

    // --- Board ---
    /// Stack index used when a channel spec omits it
    pub stack_level: u8,
    /// Explicit path to the relay-board CLI (searched on PATH otherwise)
    pub relay_cli: Option<PathBuf>,
    /// Logical input name → channel
    pub inputs: BTreeMap<String, ChannelSpec>,
    /// Logical output name → channel
    pub outputs: BTreeMap<String, ChannelSpec>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            loop_ms: 20,         // 50 Hz
            debounce_obj_ms: 80, // max ~12 objects/s
            pulse_ms: 150,
            heartbeat_ms: 500,

            // Production
            batch_size: 10,
            target_default: 100,

            // Board
            stack_level: 0,
            relay_cli: None,
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl SystemConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Range checks plus required-input presence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.loop_ms == 0 {
            return Err(ConfigError::ValidationFailed("loop_ms must be > 0"));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::ValidationFailed("batch_size must be > 0"));
        }
        if self.target_default == 0 {
            return Err(ConfigError::ValidationFailed("target_default must be > 0"));
        }
        if self.heartbeat_ms == 0 {
            return Err(ConfigError::ValidationFailed("heartbeat_ms must be > 0"));
        }
        // A pulse may overrun its width by one tick; a tick longer than the
        // pulse would make that overrun dominate.
        if self.loop_ms > self.pulse_ms {
            return Err(ConfigError::ValidationFailed("loop_ms must not exceed pulse_ms"));
        }
        self.io_map().map(|_| ())
    }

    pub fn io_map(&self) -> Result<IoMap, ConfigError> {
        IoMap::resolve(&self.inputs, &self.outputs, self.stack_level)
    }
}
