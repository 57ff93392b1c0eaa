//! Default configuration constants for lumen.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech processing and matches the INMP441-class
/// I2S microphones the controller was designed around.
pub const SAMPLE_RATE: u32 = 16000;

/// Nominal number of samples per audio block.
///
/// One block is the unit of energy estimation and voice-activity detection.
pub const BLOCK_SIZE: usize = 1024;

/// Absolute voice-activity threshold in raw i16 RMS amplitude units.
///
/// Energy readings keep the raw 16-bit scale rather than normalizing to 0..1,
/// so the threshold is large. Prevents ambient noise from triggering capture
/// once the adaptive average has settled.
pub const DETECTION_THRESHOLD: f32 = 2000.0;

/// Relative voice-activity factor.
///
/// A block counts as voice only when its energy also exceeds the moving
/// average multiplied by this factor. Prevents a uniformly loud environment
/// from registering as permanently active.
pub const RELATIVE_THRESHOLD_FACTOR: f32 = 1.5;

/// Capacity of the rolling energy history ring.
pub const ENERGY_HISTORY_LEN: usize = 10;

/// Fixed voice-command capture window in milliseconds.
///
/// Once capture starts it always runs to this window; there is no
/// cancellation path.
pub const CAPTURE_WINDOW_MS: u64 = 1500;

/// Shortest capture duration the timing classifier accepts (exclusive).
pub const MIN_COMMAND_MS: u64 = 500;

/// Longest capture duration the timing classifier accepts (inclusive).
pub const MAX_COMMAND_MS: u64 = 3000;

/// Captures longer than this map to the alternating on/off branch.
pub const TOGGLE_COMMAND_MS: u64 = 1000;

/// Captures longer than this (and at most [`TOGGLE_COMMAND_MS`]) map to a
/// status query.
pub const STATUS_COMMAND_MS: u64 = 600;

/// Heartbeat broadcast interval in milliseconds.
pub const HEARTBEAT_INTERVAL_MS: u64 = 15_000;

/// Gateway reconnect attempt interval in milliseconds.
pub const RECONNECT_INTERVAL_MS: u64 = 5_000;

/// Connectivity health-check interval in milliseconds.
pub const CONNECTIVITY_INTERVAL_MS: u64 = 10_000;

/// Inbound message delivery poll interval in milliseconds.
pub const INBOUND_INTERVAL_MS: u64 = 100;

/// Audio processing interval in milliseconds.
///
/// The finest-grained gate in the polling loop; voice timing fidelity
/// depends on it.
pub const AUDIO_INTERVAL_MS: u64 = 50;

/// Sleep between polling-loop iterations in milliseconds.
pub const TICK_SLEEP_MS: u64 = 20;

/// Default device identifier used in outbound envelopes and topic routes.
pub const DEVICE_ID: &str = "lumen-light-controller";

/// Default human-readable device name.
pub const DEVICE_NAME: &str = "Living Room Light";

/// Default path of the single-byte power-state file.
pub const STATE_FILE: &str = "lumen.state";
