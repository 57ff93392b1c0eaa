//! lumen - Voice-controlled light controller
//!
//! A polling-loop device controller: RMS energy estimation and voice
//! activity detection feed a single-flight capture machine, a classifier
//! turns finished captures into symbolic commands, and one dispatcher
//! executes commands from both the voice pipeline and the message channel.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clock;
pub mod command;
pub mod config;
pub mod controller;
pub mod defaults;
pub mod device;
pub mod error;
pub mod messaging;
pub mod update;
pub mod voice;

// Core seams (source → detect → capture → classify → dispatch)
pub use audio::source::AudioSource;
pub use audio::tone::{FeedbackCue, ToneSink};
pub use device::persistence::StateStore;
pub use device::relay::RelaySwitch;
pub use device::state::PowerState;
pub use messaging::gateway::{MessagingGateway, Topic};
pub use voice::VoiceGate;
pub use voice::classifier::CommandClassifier;

// Composition root
pub use controller::{Controller, Peripherals};

// Error handling
pub use error::{LumenError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_cargo_version() {
        let ver = version_string();
        assert!(
            ver.starts_with(env!("CARGO_PKG_VERSION")),
            "version_string should start with CARGO_PKG_VERSION, got: {}",
            ver
        );
    }

    #[test]
    fn version_string_contains_plus_when_git_hash_present() {
        let ver = version_string();
        if option_env!("GIT_HASH").is_some_and(|h| !h.is_empty()) {
            assert!(ver.contains('+'), "expected '+<hash>' suffix, got: {}", ver);
        } else {
            assert_eq!(ver, env!("CARGO_PKG_VERSION"));
        }
    }
}
