//! Command dispatch.
//!
//! The single place where a symbolic action, whether it came from the
//! voice pipeline or the message channel, becomes a device-state
//! transition, a persistence write, a feedback cue, and outbound envelopes.
//!
//! Persistence and relay writes are best-effort: failures are logged and
//! never roll back the in-memory state or fail the response. Dispatch is
//! idempotent with respect to already-matching state.

use crate::command::types::{Action, SymbolicCommand};
use crate::config::Config;
use crate::device::relay::RelaySwitch;
use crate::device::persistence::StateStore;
use crate::device::state::PowerState;
use crate::audio::tone::{FeedbackCue, ToneSink};
use crate::messaging::envelope::{
    self, HeartbeatEnvelope, RegistrationEnvelope, ResponseEnvelope, StatusEnvelope, now_ms,
};
use crate::messaging::gateway::{MessagingGateway, Topic};
use crate::voice::VoiceGate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Owns the device power state and every side effect of a command.
pub struct Dispatcher {
    device_id: String,
    device_name: String,
    power: PowerState,
    persist: bool,
    relay: Box<dyn RelaySwitch>,
    store: Box<dyn StateStore>,
    feedback: Arc<dyn ToneSink>,
    gateway: Arc<dyn MessagingGateway>,
    voice: VoiceGate,
}

impl Dispatcher {
    /// Build the dispatcher and restore persisted state.
    ///
    /// The persisted byte is read exactly once, here. A load failure is
    /// logged and the device starts Off; the relay is driven to whatever
    /// state was restored.
    pub fn new(
        config: &Config,
        mut relay: Box<dyn RelaySwitch>,
        store: Box<dyn StateStore>,
        feedback: Arc<dyn ToneSink>,
        gateway: Arc<dyn MessagingGateway>,
        voice: VoiceGate,
    ) -> Self {
        let power = match store.load() {
            Ok(Some(restored)) => restored,
            Ok(None) => PowerState::Off,
            Err(e) => {
                warn!("failed to restore persisted state: {}", e);
                PowerState::Off
            }
        };
        info!(state = power.as_str(), "initial power state");

        if let Err(e) = relay.set_power(power) {
            warn!("failed to drive relay to restored state: {}", e);
        }

        Self {
            device_id: config.device.id.clone(),
            device_name: config.device.name.clone(),
            power,
            persist: config.persistence.enabled,
            relay,
            store,
            feedback,
            gateway,
            voice,
        }
    }

    /// Current power state.
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Execute one command and return (and publish) its response.
    pub fn dispatch(&mut self, cmd: &SymbolicCommand) -> ResponseEnvelope {
        let response = match &cmd.action {
            Action::TurnOn => self.transition(PowerState::On, cmd),
            Action::TurnOff => self.transition(PowerState::Off, cmd),
            Action::GetStatus => {
                let status = self.status_envelope(Some(cmd.request_id.clone()));
                self.publish(Topic::Status, &status);
                self.response(cmd, true, None)
            }
            Action::EnableVoice => {
                self.voice.enable();
                info!(source = cmd.source.as_str(), "voice detection enabled");
                self.cue(FeedbackCue::Confirm);
                self.response(cmd, true, None)
            }
            Action::DisableVoice => {
                self.voice.disable();
                info!(source = cmd.source.as_str(), "voice detection disabled");
                self.cue(FeedbackCue::Confirm);
                self.response(cmd, true, None)
            }
            Action::Unknown(raw) => {
                warn!(command = raw.as_str(), "unknown command");
                self.cue(FeedbackCue::Error);
                self.response(cmd, false, Some(format!("Unknown command: {}", raw)))
            }
        };

        self.publish(Topic::Responses, &response);
        response
    }

    /// TurnOn/TurnOff: mutate, drive the relay, persist, confirm, broadcast.
    fn transition(&mut self, target: PowerState, cmd: &SymbolicCommand) -> ResponseEnvelope {
        info!(
            state = target.as_str(),
            source = cmd.source.as_str(),
            "switching light"
        );
        self.power = target;

        if let Err(e) = self.relay.set_power(target) {
            warn!("relay switch failed: {}", e);
        }

        if self.persist {
            if let Err(e) = self.store.save(target) {
                // Best-effort: the in-memory transition stands.
                warn!("failed to persist power state: {}", e);
            }
        }

        self.cue(FeedbackCue::Confirm);

        let status = self.status_envelope(None);
        self.publish(Topic::Status, &status);

        self.response(cmd, true, None)
    }

    /// Status snapshot of the current device state.
    pub fn status_envelope(&self, request_id: Option<String>) -> StatusEnvelope {
        StatusEnvelope {
            device_id: self.device_id.clone(),
            status: self.power.as_str().to_string(),
            timestamp: now_ms(),
            kind: "status".to_string(),
            voice_enabled: self.voice.is_enabled(),
            request_id,
        }
    }

    /// Periodic heartbeat snapshot.
    pub fn heartbeat_envelope(&self) -> HeartbeatEnvelope {
        HeartbeatEnvelope {
            device_id: self.device_id.clone(),
            name: self.device_name.clone(),
            status: self.power.as_str().to_string(),
            timestamp: now_ms(),
            kind: "heartbeat".to_string(),
            voice_enabled: self.voice.is_enabled(),
        }
    }

    /// Registration announcement sent after each successful (re)connect.
    pub fn registration_envelope(&self) -> RegistrationEnvelope {
        RegistrationEnvelope::new(
            &self.device_id,
            &self.device_name,
            self.power.as_str(),
            now_ms(),
        )
    }

    fn response(
        &self,
        cmd: &SymbolicCommand,
        success: bool,
        error: Option<String>,
    ) -> ResponseEnvelope {
        ResponseEnvelope {
            device_id: self.device_id.clone(),
            command: cmd.action.wire_name().to_string(),
            request_id: cmd.request_id.clone(),
            success,
            status: self.power.as_str().to_string(),
            timestamp: now_ms(),
            source: cmd.source.as_str().to_string(),
            error,
        }
    }

    /// Publish an envelope, logging (not surfacing) failures: a momentarily
    /// broken channel is a transient condition.
    fn publish<T: Serialize>(&self, topic: Topic, envelope: &T) {
        match envelope::encode(envelope) {
            Ok(payload) => {
                if let Err(e) = self.gateway.publish(topic, &payload) {
                    warn!(topic = topic.as_str(), "publish failed: {}", e);
                }
            }
            Err(e) => warn!(topic = topic.as_str(), "envelope encoding failed: {}", e),
        }
    }

    fn cue(&self, cue: FeedbackCue) {
        if let Err(e) = self.feedback.play(cue) {
            warn!("feedback cue failed: {}", e);
        }
    }
}
