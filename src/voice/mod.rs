//! Voice command pipeline: capture lifecycle and command classification.

pub mod capture;
pub mod classifier;

pub use capture::{CaptureConfig, CaptureMachine, CaptureState, CaptureTransition, CaptureWindow};
pub use classifier::{CommandClassifier, DurationClassifier, PhraseClassifier};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared voice-detection enable flag.
///
/// The one piece of cross-cutting mutable state in the controller: written
/// by the dispatcher (enable/disable commands) and the firmware-update
/// monitor, read by the audio loop, which short-circuits before touching the
/// audio source while disabled. Passed explicitly to each party rather than
/// living as a global.
#[derive(Debug, Clone)]
pub struct VoiceGate {
    enabled: Arc<AtomicBool>,
}

impl VoiceGate {
    /// Create a gate with the given initial state.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    /// Whether voice processing is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Set the gate.
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Enable voice processing.
    pub fn enable(&self) {
        self.set(true);
    }

    /// Disable voice processing.
    pub fn disable(&self) {
        self.set(false);
    }
}

impl Default for VoiceGate {
    fn default() -> Self {
        Self::new(true)
    }
}
