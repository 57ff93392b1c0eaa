//! End-to-end controller tests: mock peripherals, mock clock, real loop.

use lumen::audio::source::MockAudioSource;
use lumen::audio::tone::{FeedbackCue, MockToneSink};
use lumen::clock::MockClock;
use lumen::config::Config;
use lumen::controller::{Controller, Peripherals};
use lumen::device::persistence::MockStateStore;
use lumen::device::relay::MockRelay;
use lumen::device::state::PowerState;
use lumen::messaging::envelope::{ResponseEnvelope, StatusEnvelope};
use lumen::messaging::gateway::{MessagingGateway, MockGateway, Topic};
use lumen::update::UpdateEvent;
use lumen::voice::classifier::DurationClassifier;
use std::sync::Arc;
use std::time::Duration;

struct Rig {
    controller: Controller<MockClock>,
    clock: MockClock,
    gateway: Arc<MockGateway>,
    relay: MockRelay,
    store: MockStateStore,
    feedback: Arc<MockToneSink>,
    source: MockAudioSource,
}

fn build_rig(store: MockStateStore, gateway: MockGateway, source: MockAudioSource) -> Rig {
    let config = Config::default();
    let clock = MockClock::new();
    let gateway = Arc::new(gateway);
    let relay = MockRelay::new();
    let feedback = Arc::new(MockToneSink::new());

    let controller = Controller::new(
        &config,
        clock.clone(),
        Peripherals {
            relay: Box::new(relay.clone()),
            store: Box::new(store.clone()),
            feedback: Arc::clone(&feedback) as Arc<dyn lumen::ToneSink>,
            gateway: Arc::clone(&gateway) as Arc<dyn MessagingGateway>,
            source: Some(Box::new(source.clone())),
            classifier: Box::new(DurationClassifier::new()),
        },
    );

    Rig {
        controller,
        clock,
        gateway,
        relay,
        store,
        feedback,
        source,
    }
}

fn rig_with(store: MockStateStore, gateway: MockGateway) -> Rig {
    build_rig(store, gateway, MockAudioSource::new())
}

fn rig() -> Rig {
    rig_with(MockStateStore::new(), MockGateway::new())
}

fn last_response(gateway: &MockGateway) -> ResponseEnvelope {
    let responses = gateway.published_on(Topic::Responses);
    let payload = responses.last().expect("a response was published");
    serde_json::from_str(payload).expect("response payload parses")
}

#[test]
fn startup_plays_the_boot_cue() {
    let r = rig();
    assert_eq!(r.feedback.played().first(), Some(&FeedbackCue::Startup));
    assert_eq!(r.controller.power(), PowerState::Off);
}

#[test]
fn get_status_round_trip() {
    let mut r = rig();
    r.gateway
        .push_inbound(r#"{"command":"get_status","requestId":"r1"}"#);
    r.controller.tick();

    let response = last_response(&r.gateway);
    assert!(response.success);
    assert_eq!(response.request_id, "r1");
    assert_eq!(response.status, "off");
    assert_eq!(response.source, "channel");

    // Correlated status snapshot alongside the response, and no mutation:
    // the only relay write is the startup state sync. The first Status
    // publish of the tick is the registration announcement.
    let statuses = r.gateway.published_on(Topic::Status);
    let status: StatusEnvelope =
        serde_json::from_str(statuses.last().expect("a status was published")).unwrap();
    assert_eq!(status.request_id.as_deref(), Some("r1"));
    assert_eq!(r.relay.transitions().len(), 1);
    assert!(r.store.saves().is_empty());
}

#[test]
fn turn_on_persists_broadcasts_and_stays_idempotent() {
    let mut r = rig();
    r.gateway
        .push_inbound(r#"{"command":"turn_on","requestId":"a"}"#);
    r.controller.tick();

    assert_eq!(r.controller.power(), PowerState::On);
    assert_eq!(r.relay.last(), Some(PowerState::On));
    assert_eq!(r.store.persisted(), Some(PowerState::On));
    assert!(last_response(&r.gateway).success);
    // Registration announcement plus the transition broadcast.
    assert_eq!(r.gateway.published_on(Topic::Status).len(), 2);

    // Same command again: still a success, state unchanged.
    r.gateway
        .push_inbound(r#"{"command":"turn_on","requestId":"b"}"#);
    r.clock.advance(Duration::from_millis(100));
    r.controller.tick();

    let response = last_response(&r.gateway);
    assert!(response.success);
    assert_eq!(response.request_id, "b");
    assert_eq!(r.controller.power(), PowerState::On);
}

#[test]
fn malformed_payloads_are_dropped_without_a_response() {
    let mut r = rig();
    r.gateway.push_inbound("this is not json");
    r.gateway.push_inbound(r#"{"requestId":"only"}"#);
    r.controller.tick();

    assert!(r.gateway.published_on(Topic::Responses).is_empty());
    assert_eq!(r.controller.power(), PowerState::Off);
}

#[test]
fn unknown_command_gets_a_failure_response_and_an_error_cue() {
    let mut r = rig();
    r.gateway
        .push_inbound(r#"{"command":"warp_drive","requestId":"r9"}"#);
    r.controller.tick();

    let response = last_response(&r.gateway);
    assert!(!response.success);
    assert_eq!(response.command, "warp_drive");
    assert!(response.error.unwrap().contains("warp_drive"));
    assert!(r.feedback.played().contains(&FeedbackCue::Error));
    assert_eq!(r.controller.power(), PowerState::Off);
}

#[test]
fn disable_voice_stops_audio_reads_until_reenabled() {
    let mut r = rig();

    // Inbound drains before the audio gate within a tick, so the disable
    // takes effect before the first read.
    r.gateway
        .push_inbound(r#"{"command":"disable_voice","requestId":"d"}"#);
    r.controller.tick();
    assert_eq!(r.source.reads(), 0);

    r.clock.advance(Duration::from_millis(100));
    r.controller.tick();
    assert_eq!(r.source.reads(), 0);

    r.gateway
        .push_inbound(r#"{"command":"enable_voice","requestId":"e"}"#);
    r.clock.advance(Duration::from_millis(100));
    r.controller.tick();
    assert_eq!(r.source.reads(), 1);
}

#[test]
fn heartbeat_fires_immediately_then_on_its_interval() {
    let mut r = rig();
    r.controller.tick();
    assert_eq!(r.gateway.published_on(Topic::Heartbeat).len(), 1);

    r.clock.advance(Duration::from_secs(14));
    r.controller.tick();
    assert_eq!(r.gateway.published_on(Topic::Heartbeat).len(), 1);

    r.clock.advance(Duration::from_secs(1));
    r.controller.tick();
    assert_eq!(r.gateway.published_on(Topic::Heartbeat).len(), 2);
}

#[test]
fn persisted_state_is_restored_and_reported() {
    let mut r = rig_with(MockStateStore::new().with_state(PowerState::On), MockGateway::new());
    assert_eq!(r.controller.power(), PowerState::On);
    assert_eq!(r.relay.last(), Some(PowerState::On));

    r.gateway
        .push_inbound(r#"{"command":"get_status","requestId":"s"}"#);
    r.controller.tick();
    assert_eq!(last_response(&r.gateway).status, "on");
}

#[test]
fn reconnect_publishes_a_registration_announcement() {
    let mut r = rig_with(MockStateStore::new(), MockGateway::disconnected());
    r.gateway.refuse_connect(true);

    r.controller.tick();
    assert!(!r.gateway.is_connected());
    assert!(r.gateway.published_on(Topic::Status).is_empty());

    // Reconnects are rate-limited to their own interval.
    r.gateway.refuse_connect(false);
    r.clock.advance(Duration::from_secs(4));
    r.controller.tick();
    assert!(!r.gateway.is_connected());

    r.clock.advance(Duration::from_secs(1));
    r.controller.tick();
    assert!(r.gateway.is_connected());

    let statuses = r.gateway.published_on(Topic::Status);
    assert_eq!(statuses.len(), 1);
    let registration: serde_json::Value = serde_json::from_str(&statuses[0]).unwrap();
    assert_eq!(registration["type"], "registration");
    assert!(registration["capabilities"].as_array().is_some());
}

#[test]
fn already_connected_gateway_registers_once_at_startup() {
    let mut r = rig();
    r.controller.tick();

    let statuses = r.gateway.published_on(Topic::Status);
    assert_eq!(statuses.len(), 1);
    let registration: serde_json::Value = serde_json::from_str(&statuses[0]).unwrap();
    assert_eq!(registration["type"], "registration");

    // The announcement is per-connection, not per-tick.
    r.clock.advance(Duration::from_millis(200));
    r.controller.tick();
    assert_eq!(r.gateway.published_on(Topic::Status).len(), 1);
}

#[test]
fn read_errors_do_not_stall_an_open_capture_window() {
    let mut r = build_rig(
        MockStateStore::new(),
        MockGateway::new(),
        MockAudioSource::new().with_read_failure(),
    );

    // One loud block starts a capture; every read after that errors.
    r.source.push_block(vec![10_000; 1024]);
    r.controller.tick();
    assert!(r.feedback.played().contains(&FeedbackCue::Listening));

    // The window still resolves on schedule and the command dispatches.
    r.clock.advance(Duration::from_millis(1501));
    r.controller.tick();
    assert_eq!(r.controller.power(), PowerState::On);
    assert_eq!(r.gateway.published_on(Topic::VoiceEvents).len(), 1);
}

#[test]
fn voice_flow_from_loud_block_to_dispatched_command() {
    let mut r = rig();

    // One loud block: RMS ~10000 clears both thresholds against a cold ring.
    r.source.push_block(vec![10_000; 1024]);
    r.controller.tick();
    assert!(r.feedback.played().contains(&FeedbackCue::Listening));

    // Silence until the window elapses; the capture resolves on schedule.
    r.clock.advance(Duration::from_millis(1501));
    r.controller.tick();

    // 1501 ms is in the long-utterance range: first long capture is TurnOn.
    assert_eq!(r.controller.power(), PowerState::On);
    assert_eq!(r.relay.last(), Some(PowerState::On));

    let response = last_response(&r.gateway);
    assert!(response.success);
    assert_eq!(response.command, "turn_on");
    assert_eq!(response.source, "voice");
    assert!(response.request_id.starts_with("voice_"));

    let events = r.gateway.published_on(Topic::VoiceEvents);
    assert_eq!(events.len(), 1);
    let event: serde_json::Value = serde_json::from_str(&events[0]).unwrap();
    assert_eq!(event["action"], "turn_on");
    assert_eq!(event["source"], "voice");
}

#[test]
fn quiet_blocks_never_start_a_capture() {
    let mut r = rig();
    for _ in 0..5 {
        r.source.push_block(vec![50; 1024]);
        r.clock.advance(Duration::from_millis(50));
        r.controller.tick();
    }
    assert!(!r.feedback.played().contains(&FeedbackCue::Listening));
    assert!(r.gateway.published_on(Topic::VoiceEvents).is_empty());
}

#[test]
fn unrecognized_capture_plays_the_error_cue_and_dispatches_nothing() {
    let mut r = rig();
    r.source.push_block(vec![10_000; 1024]);
    r.controller.tick();

    // Resolve far past the valid command range.
    r.clock.advance(Duration::from_millis(3500));
    r.controller.tick();

    assert!(r.feedback.played().contains(&FeedbackCue::Error));
    assert_eq!(r.controller.power(), PowerState::Off);
    assert!(r.gateway.published_on(Topic::VoiceEvents).is_empty());
    assert!(r.gateway.published_on(Topic::Responses).is_empty());
}

#[test]
fn update_session_suspends_voice_and_restores_it() {
    let mut r = rig();
    r.controller.tick();
    let reads_before = r.source.reads();

    r.controller.observe_update(&UpdateEvent::Started);
    r.clock.advance(Duration::from_millis(100));
    r.controller.tick();
    assert_eq!(r.source.reads(), reads_before);
    assert!(r.feedback.played().contains(&FeedbackCue::UpdateStarted));

    r.controller.observe_update(&UpdateEvent::Completed);
    r.clock.advance(Duration::from_millis(100));
    r.controller.tick();
    assert_eq!(r.source.reads(), reads_before + 1);
    assert!(r.feedback.played().contains(&FeedbackCue::UpdateFinished));
}

#[test]
fn broken_audio_source_disables_voice_but_not_the_channel() {
    let config = Config::default();
    let gateway = Arc::new(MockGateway::new());
    let mut controller = Controller::new(
        &config,
        MockClock::new(),
        Peripherals {
            relay: Box::new(MockRelay::new()),
            store: Box::new(MockStateStore::new()),
            feedback: Arc::new(MockToneSink::new()),
            gateway: Arc::clone(&gateway) as Arc<dyn MessagingGateway>,
            source: Some(Box::new(MockAudioSource::new().with_start_failure())),
            classifier: Box::new(DurationClassifier::new()),
        },
    );

    assert!(!controller.voice_gate().is_enabled());

    gateway.push_inbound(r#"{"command":"turn_on","requestId":"x"}"#);
    controller.tick();
    assert_eq!(controller.power(), PowerState::On);
}
