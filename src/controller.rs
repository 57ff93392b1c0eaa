//! Cooperative polling loop.
//!
//! A single loop owns every concern: connectivity checks, reconnect
//! attempts, inbound command draining, heartbeats, and the audio pipeline.
//! Each concern runs behind its own interval gate; the clock is read once
//! per tick and that one `Instant` is threaded through all gates and the
//! capture machine, so every timing decision within a tick agrees.
//!
//! Gates start unarmed and fire on their first eligible tick, then settle
//! into their configured cadence.

use crate::audio::energy::EnergyEstimator;
use crate::audio::source::AudioSource;
use crate::audio::tone::{FeedbackCue, ToneSink};
use crate::audio::vad::{VadConfig, VoiceActivityDetector};
use crate::clock::{Clock, SystemClock};
use crate::command::dispatcher::Dispatcher;
use crate::command::types::{Action, SymbolicCommand};
use crate::config::Config;
use crate::device::persistence::StateStore;
use crate::device::relay::RelaySwitch;
use crate::device::state::PowerState;
use crate::messaging::envelope::{self, CommandEnvelope, VoiceEventEnvelope, now_ms};
use crate::messaging::gateway::{MessagingGateway, Topic};
use crate::update::{UpdateEvent, UpdateMonitor};
use crate::voice::VoiceGate;
use crate::voice::capture::{CaptureConfig, CaptureMachine, CaptureTransition};
use crate::voice::classifier::CommandClassifier;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Everything the controller talks to through a seam.
pub struct Peripherals {
    pub relay: Box<dyn RelaySwitch>,
    pub store: Box<dyn StateStore>,
    pub feedback: Arc<dyn ToneSink>,
    pub gateway: Arc<dyn MessagingGateway>,
    /// `None` runs the controller without a voice pipeline.
    pub source: Option<Box<dyn AudioSource>>,
    pub classifier: Box<dyn CommandClassifier>,
}

/// The device controller and its polling loop.
pub struct Controller<C: Clock = SystemClock> {
    clock: C,
    device_id: String,
    dispatcher: Dispatcher,
    gateway: Arc<dyn MessagingGateway>,
    feedback: Arc<dyn ToneSink>,
    voice: VoiceGate,
    update: UpdateMonitor,

    source: Option<Box<dyn AudioSource>>,
    energy: EnergyEstimator,
    vad: VoiceActivityDetector,
    capture: CaptureMachine,
    classifier: Box<dyn CommandClassifier>,

    connectivity_interval: Duration,
    reconnect_interval: Duration,
    inbound_interval: Duration,
    heartbeat_interval: Duration,
    audio_interval: Duration,
    tick_sleep: Duration,

    last_connectivity: Option<Instant>,
    last_reconnect: Option<Instant>,
    last_inbound: Option<Instant>,
    last_heartbeat: Option<Instant>,
    last_audio: Option<Instant>,
    registered: bool,
}

/// Interval gate. `None` means unarmed, so the first eligible tick fires.
fn due(last: &mut Option<Instant>, interval: Duration, now: Instant) -> bool {
    match last {
        Some(prev) if now.duration_since(*prev) < interval => false,
        _ => {
            *last = Some(now);
            true
        }
    }
}

impl<C: Clock> Controller<C> {
    /// Assemble the controller, restore persisted state, and start audio.
    ///
    /// A missing or broken audio source is not fatal: the voice gate is
    /// closed and the controller runs on the message channel alone.
    pub fn new(config: &Config, clock: C, peripherals: Peripherals) -> Self {
        let voice = VoiceGate::new(config.voice.enabled);

        let dispatcher = Dispatcher::new(
            config,
            peripherals.relay,
            peripherals.store,
            Arc::clone(&peripherals.feedback),
            Arc::clone(&peripherals.gateway),
            voice.clone(),
        );

        let update = UpdateMonitor::new(voice.clone(), Arc::clone(&peripherals.feedback));

        let vad = VoiceActivityDetector::new(VadConfig {
            absolute_threshold: config.voice.absolute_threshold,
            relative_factor: config.voice.relative_factor,
        });
        let capture = CaptureMachine::new(CaptureConfig {
            window: Duration::from_millis(config.voice.capture_window_ms),
        });

        let mut source = peripherals.source;
        match source.as_mut() {
            Some(s) => {
                if let Err(e) = s.start() {
                    warn!("audio source failed to start, voice disabled: {}", e);
                    source = None;
                    voice.disable();
                }
            }
            None => {
                info!("no audio source attached, voice disabled");
                voice.disable();
            }
        }

        if let Err(e) = peripherals.feedback.play(FeedbackCue::Startup) {
            warn!("startup cue failed: {}", e);
        }

        Self {
            clock,
            device_id: config.device.id.clone(),
            dispatcher,
            gateway: peripherals.gateway,
            feedback: peripherals.feedback,
            voice,
            update,
            source,
            energy: EnergyEstimator::new(),
            vad,
            capture,
            classifier: peripherals.classifier,
            connectivity_interval: Duration::from_millis(config.timing.connectivity_ms),
            reconnect_interval: Duration::from_millis(config.timing.reconnect_ms),
            inbound_interval: Duration::from_millis(config.timing.inbound_ms),
            heartbeat_interval: Duration::from_millis(config.timing.heartbeat_ms),
            audio_interval: Duration::from_millis(config.timing.audio_ms),
            tick_sleep: Duration::from_millis(config.timing.tick_sleep_ms),
            last_connectivity: None,
            last_reconnect: None,
            last_inbound: None,
            last_heartbeat: None,
            last_audio: None,
            registered: false,
        }
    }

    /// Current power state.
    pub fn power(&self) -> PowerState {
        self.dispatcher.power()
    }

    /// Handle to the shared voice gate.
    pub fn voice_gate(&self) -> VoiceGate {
        self.voice.clone()
    }

    /// Run the loop forever.
    pub fn run(&mut self) {
        info!(device_id = self.device_id.as_str(), "controller running");
        loop {
            self.tick();
            std::thread::sleep(self.tick_sleep);
        }
    }

    /// One loop iteration. Exactly one clock read.
    pub fn tick(&mut self) {
        let now = self.clock.now();

        if due(&mut self.last_connectivity, self.connectivity_interval, now)
            && !self.gateway.is_connected()
        {
            warn!("gateway disconnected");
        }

        if self.gateway.is_connected() {
            if !self.registered {
                self.register();
            }
            if due(&mut self.last_inbound, self.inbound_interval, now) {
                self.drain_inbound();
            }
            if due(&mut self.last_heartbeat, self.heartbeat_interval, now) {
                self.publish(Topic::Heartbeat, &self.dispatcher.heartbeat_envelope());
            }
        } else {
            self.registered = false;
            if due(&mut self.last_reconnect, self.reconnect_interval, now) {
                match self.gateway.connect() {
                    Ok(()) => {
                        info!("gateway reconnected");
                        self.register();
                    }
                    Err(e) => debug!("reconnect attempt failed: {}", e),
                }
            }
        }

        if due(&mut self.last_audio, self.audio_interval, now) {
            self.audio_tick(now);
        }
    }

    /// Feed one event from the firmware-update transport.
    pub fn observe_update(&mut self, event: &UpdateEvent) {
        self.update.observe(event);
    }

    /// Announce this device on the status channel.
    ///
    /// Fires once per connection: on the first tick with an already-live
    /// gateway, and again after every successful reconnect.
    fn register(&mut self) {
        self.publish(Topic::Status, &self.dispatcher.registration_envelope());
        self.registered = true;
    }

    fn drain_inbound(&mut self) {
        while let Some(payload) = self.gateway.poll_inbound() {
            self.handle_inbound(&payload);
        }
    }

    fn handle_inbound(&mut self, payload: &str) {
        // Malformed envelopes are dropped without a response; only
        // well-formed envelopes with an unknown command get an error back.
        let envelope = match CommandEnvelope::from_json(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("dropping malformed command payload: {}", e);
                return;
            }
        };
        debug!(
            command = envelope.command.as_str(),
            request_id = envelope.request_id.as_str(),
            "inbound command"
        );
        let cmd = SymbolicCommand::from_channel(&envelope.command, envelope.request_id);
        self.dispatcher.dispatch(&cmd);
    }

    /// One pass of the audio pipeline.
    ///
    /// Short-circuits before touching the source while the voice gate is
    /// closed. A tick with no block ready still advances the capture
    /// machine, so an open window resolves on schedule even in silence.
    fn audio_tick(&mut self, now: Instant) {
        if !self.voice.is_enabled() {
            return;
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };

        // A read error is treated like an empty tick: the capture machine
        // still advances, so an open window resolves on schedule.
        let block = match source.read_block() {
            Ok(block) => block,
            Err(e) => {
                warn!("audio read failed: {}", e);
                None
            }
        };

        let (active, average) = match block.and_then(|b| self.energy.push_block(&b)) {
            Some(reading) => {
                let average = self.energy.moving_average();
                let event = self.vad.detect(reading, average);
                if event.active {
                    debug!(
                        energy = event.energy,
                        average = event.average,
                        "voice activity"
                    );
                }
                (event.active, average)
            }
            None => (false, self.energy.moving_average()),
        };

        match self.capture.observe(active, now, average) {
            Some(CaptureTransition::Started) => {
                info!("voice capture started");
                self.cue(FeedbackCue::Listening);
            }
            Some(CaptureTransition::Finished(window)) => {
                debug!(
                    duration_ms = window.duration.as_millis() as u64,
                    classifier = self.classifier.name(),
                    "voice capture finished"
                );
                match self.classifier.classify(&window) {
                    Some(action) => self.run_voice_command(action),
                    None => {
                        info!("capture did not resolve to a command");
                        self.cue(FeedbackCue::Error);
                    }
                }
            }
            None => {}
        }
    }

    fn run_voice_command(&mut self, action: Action) {
        let request_id = format!("voice_{}", now_ms());
        info!(
            action = action.wire_name(),
            request_id = request_id.as_str(),
            "voice command recognized"
        );

        let event = VoiceEventEnvelope {
            device_id: self.device_id.clone(),
            action: action.wire_name().to_string(),
            timestamp: now_ms(),
            source: "voice".to_string(),
            request_id: request_id.clone(),
        };

        let cmd = SymbolicCommand::from_voice(action, request_id);
        self.dispatcher.dispatch(&cmd);
        self.publish(Topic::VoiceEvents, &event);
    }

    fn publish<T: serde::Serialize>(&self, topic: Topic, payload: &T) {
        match envelope::encode(payload) {
            Ok(json) => {
                if let Err(e) = self.gateway.publish(topic, &json) {
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
