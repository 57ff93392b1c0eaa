//! Firmware-update session monitor.
//!
//! While an update session is in flight the voice pipeline is suspended so
//! capture work cannot stall the transfer. The monitor remembers whether
//! voice was enabled when the session started and restores exactly that
//! state when the session ends, whichever way it ends.

use crate::audio::tone::{FeedbackCue, ToneSink};
use crate::voice::VoiceGate;
use std::sync::Arc;
use tracing::{info, warn};

/// Events emitted by the update transport.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    Started,
    Progress { percent: u8 },
    Completed,
    Failed { reason: String },
}

/// Tracks the update session and gates the voice pipeline around it.
pub struct UpdateMonitor {
    voice: VoiceGate,
    feedback: Arc<dyn ToneSink>,
    active: bool,
    resume_voice: bool,
}

impl UpdateMonitor {
    pub fn new(voice: VoiceGate, feedback: Arc<dyn ToneSink>) -> Self {
        Self {
            voice,
            feedback,
            active: false,
            resume_voice: false,
        }
    }

    /// Whether an update session is currently in flight.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feed one event from the update transport.
    pub fn observe(&mut self, event: &UpdateEvent) {
        match event {
            UpdateEvent::Started => {
                info!("update session started, suspending voice pipeline");
                self.resume_voice = self.voice.is_enabled();
                self.voice.disable();
                self.active = true;
                self.cue(FeedbackCue::UpdateStarted);
            }
            UpdateEvent::Progress { percent } => {
                info!(percent, "update progress");
            }
            UpdateEvent::Completed => {
                info!("update session completed");
                self.finish(FeedbackCue::UpdateFinished);
            }
            UpdateEvent::Failed { reason } => {
                warn!(reason = reason.as_str(), "update session failed");
                self.finish(FeedbackCue::Error);
            }
        }
    }

    /// End the session and restore the pre-session voice state.
    fn finish(&mut self, cue: FeedbackCue) {
        self.voice.set(self.resume_voice);
        self.active = false;
        self.cue(cue);
    }

    fn cue(&self, cue: FeedbackCue) {
        if let Err(e) = self.feedback.play(cue) {
            warn!("feedback cue failed: {}", e);
        }
    }
}
