//! Error types for lumen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumenError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio boundary errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    #[error("Tone playback failed: {message}")]
    TonePlayback { message: String },

    // Messaging errors
    #[error("Messaging gateway disconnected")]
    GatewayDisconnected,

    #[error("Failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    #[error("Malformed envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    // Device errors
    #[error("Relay switch failed: {message}")]
    Relay { message: String },

    #[error("State persistence failed: {message}")]
    Persistence { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, LumenError>;
