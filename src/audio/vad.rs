//! Voice Activity Detection (VAD).
//!
//! Stateless per-block decision combining an absolute energy threshold with
//! a relative one against the rolling average. Both conditions are required:
//! the relative condition keeps a uniformly loud environment from registering
//! as permanently active, the absolute condition keeps ambient noise from
//! false-triggering once the average has adapted upward.

use crate::audio::energy::EnergyReading;
use crate::defaults;

/// Configuration for voice-activity detection.
#[derive(Debug, Clone, Copy)]
pub struct VadConfig {
    /// Absolute RMS threshold in raw i16 amplitude units.
    pub absolute_threshold: f32,
    /// Multiplier applied to the moving average for the relative condition.
    pub relative_factor: f32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            absolute_threshold: defaults::DETECTION_THRESHOLD,
            relative_factor: defaults::RELATIVE_THRESHOLD_FACTOR,
        }
    }
}

/// Per-block detection result, carrying the inputs that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceActivityEvent {
    /// Whether voice was considered present in this block.
    pub active: bool,
    /// The triggering energy reading.
    pub energy: f32,
    /// The contemporaneous moving average.
    pub average: f32,
}

/// Voice activity detector.
///
/// Holds only its thresholds; the energy history is owned by the estimator
/// and enters here as the read-only `average` argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceActivityDetector {
    config: VadConfig,
}

impl VoiceActivityDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: VadConfig) -> Self {
        Self { config }
    }

    /// Evaluate one energy reading against both thresholds.
    pub fn detect(&self, reading: EnergyReading, average: f32) -> VoiceActivityEvent {
        let active = reading.value > self.config.absolute_threshold
            && reading.value > average * self.config.relative_factor;
        VoiceActivityEvent {
            active,
            energy: reading.value,
            average,
        }
    }
}
