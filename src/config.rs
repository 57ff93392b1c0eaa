//! TOML configuration.
//!
//! Every section and field is optional; missing pieces fall back to the
//! compiled defaults in [`crate::defaults`], so an empty file (or no file at
//! all) yields a fully working configuration.

use crate::defaults;
use crate::error::{LumenError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: DeviceConfig,
    pub audio: AudioConfig,
    pub voice: VoiceConfig,
    pub timing: TimingConfig,
    pub persistence: PersistenceConfig,
}

/// Identity reported in every outbound envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub id: String,
    pub name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: defaults::DEVICE_ID.to_string(),
            name: defaults::DEVICE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudioConfig {
    /// Input device name; `None` selects the system default.
    pub device: Option<String>,
    pub sample_rate: u32,
    pub block_size: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: None,
            sample_rate: defaults::SAMPLE_RATE,
            block_size: defaults::BLOCK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceConfig {
    /// Initial state of the voice gate.
    pub enabled: bool,
    pub absolute_threshold: f32,
    pub relative_factor: f32,
    pub capture_window_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            absolute_threshold: defaults::DETECTION_THRESHOLD,
            relative_factor: defaults::RELATIVE_THRESHOLD_FACTOR,
            capture_window_ms: defaults::CAPTURE_WINDOW_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub heartbeat_ms: u64,
    pub reconnect_ms: u64,
    pub connectivity_ms: u64,
    pub inbound_ms: u64,
    pub audio_ms: u64,
    pub tick_sleep_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            heartbeat_ms: defaults::HEARTBEAT_INTERVAL_MS,
            reconnect_ms: defaults::RECONNECT_INTERVAL_MS,
            connectivity_ms: defaults::CONNECTIVITY_INTERVAL_MS,
            inbound_ms: defaults::INBOUND_INTERVAL_MS,
            audio_ms: defaults::AUDIO_INTERVAL_MS,
            tick_sleep_ms: defaults::TICK_SLEEP_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: defaults::STATE_FILE.to_string(),
        }
    }
}

impl Config {
    /// Load a configuration file, failing if it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LumenError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                LumenError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        match Self::load(&path) {
            Ok(config) => Ok(config),
            Err(LumenError::ConfigFileNotFound { path }) => {
                debug!(path = %path, "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.audio.block_size == 0 {
            return Err(LumenError::ConfigInvalidValue {
                key: "audio.block_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.audio.sample_rate == 0 {
            return Err(LumenError::ConfigInvalidValue {
                key: "audio.sample_rate".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.voice.relative_factor <= 0.0 {
            return Err(LumenError::ConfigInvalidValue {
                key: "voice.relative_factor".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.voice.capture_window_ms == 0 {
            return Err(LumenError::ConfigInvalidValue {
                key: "voice.capture_window_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
