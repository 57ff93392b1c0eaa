use anyhow::Result;
use clap::Parser;
use lumen::audio::source::AudioSource;
use lumen::audio::tone::LogToneSink;
use lumen::cli::Cli;
use lumen::clock::SystemClock;
use lumen::config::Config;
use lumen::controller::{Controller, Peripherals};
use lumen::device::persistence::FileStateStore;
use lumen::device::relay::LogRelay;
use lumen::messaging::gateway::StdioGateway;
use lumen::voice::classifier::DurationClassifier;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .init();

    tracing::info!(version = %lumen::version_string(), "starting");

    let config = load_config(&cli)?;

    let peripherals = Peripherals {
        relay: Box::new(LogRelay),
        store: Box::new(FileStateStore::new(&config.persistence.path)),
        feedback: Arc::new(LogToneSink),
        gateway: Arc::new(StdioGateway::new(&config.device.id)),
        source: open_audio_source(&config),
        classifier: Box::new(DurationClassifier::new()),
    };

    let mut controller = Controller::new(&config, SystemClock, peripherals);
    controller.run();

    Ok(())
}

/// Load configuration and apply CLI overrides.
///
/// An explicit `--config` path must exist; without one, a missing
/// `lumen.toml` falls back to built-in defaults.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default("lumen.toml")?,
    };

    if let Some(id) = &cli.device_id {
        config.device.id = id.clone();
    }
    if let Some(name) = &cli.device_name {
        config.device.name = name.clone();
    }
    if let Some(path) = &cli.state_file {
        config.persistence.path = path.clone();
    }
    if cli.no_voice {
        config.voice.enabled = false;
    }

    Ok(config)
}

#[cfg(feature = "cpal-audio")]
fn open_audio_source(config: &Config) -> Option<Box<dyn AudioSource>> {
    use lumen::audio::capture::CpalAudioSource;
    use lumen::audio::source::AudioSourceConfig;

    let source_config = AudioSourceConfig {
        device: config.audio.device.clone(),
        sample_rate: config.audio.sample_rate,
        block_size: config.audio.block_size,
    };
    match CpalAudioSource::new(&source_config) {
        Ok(source) => Some(Box::new(source)),
        Err(e) => {
            tracing::warn!("audio device unavailable: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "cpal-audio"))]
fn open_audio_source(_config: &Config) -> Option<Box<dyn AudioSource>> {
    None
}
