//! Messaging gateway seam.
//!
//! The controller only needs four things from its transport: a connection
//! health check, a (re)connect attempt, inbound payload polling, and
//! publishing to one of four logical topics. The trait allows swapping
//! implementations (broker-backed, channel-backed, stdio, mock).

use crate::error::{LumenError, Result};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Logical outbound destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Status,
    Heartbeat,
    Responses,
    VoiceEvents,
}

impl Topic {
    /// Short topic name.
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Status => "status",
            Topic::Heartbeat => "heartbeat",
            Topic::Responses => "responses",
            Topic::VoiceEvents => "voice_events",
        }
    }

    /// Full per-device route, e.g. `devices/lamp-1/status`.
    pub fn route(self, device_id: &str) -> String {
        format!("devices/{}/{}", device_id, self.as_str())
    }
}

/// Trait for the publish-subscribe transport.
pub trait MessagingGateway: Send + Sync {
    /// Whether the transport currently considers itself connected.
    fn is_connected(&self) -> bool;

    /// Attempt to (re)establish the connection.
    fn connect(&self) -> Result<()>;

    /// Pop one pending inbound payload, if any.
    fn poll_inbound(&self) -> Option<String>;

    /// Publish a payload to a logical topic.
    fn publish(&self, topic: Topic, payload: &str) -> Result<()>;
}

/// Gateway backed by in-process channels.
///
/// Inbound payloads are fed through the paired [`GatewayHarness`]; outbound
/// publishes come out of it. Used to wire the controller to any transport
/// running elsewhere in the process.
pub struct ChannelGateway {
    inbound: Receiver<String>,
    outbound: Sender<(Topic, String)>,
}

/// The far end of a [`ChannelGateway`].
pub struct GatewayHarness {
    pub inbound_tx: Sender<String>,
    pub outbound_rx: Receiver<(Topic, String)>,
}

impl ChannelGateway {
    /// Create a connected gateway/harness pair.
    pub fn pair() -> (Self, GatewayHarness) {
        let (inbound_tx, inbound) = unbounded();
        let (outbound, outbound_rx) = unbounded();
        (
            Self { inbound, outbound },
            GatewayHarness {
                inbound_tx,
                outbound_rx,
            },
        )
    }
}

impl MessagingGateway for ChannelGateway {
    fn is_connected(&self) -> bool {
        true
    }

    fn connect(&self) -> Result<()> {
        Ok(())
    }

    fn poll_inbound(&self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    fn publish(&self, topic: Topic, payload: &str) -> Result<()> {
        self.outbound
            .send((topic, payload.to_string()))
            .map_err(|_| LumenError::Publish {
                topic: topic.as_str().to_string(),
                message: "channel closed".to_string(),
            })
    }
}

/// JSON-lines gateway over stdin/stdout.
///
/// One inbound command envelope per stdin line; each publish becomes one
/// stdout line of `{"topic": <route>, "payload": <envelope>}`. Lets the
/// binary run against a broker bridge or be driven by hand.
pub struct StdioGateway {
    device_id: String,
    inbound: Receiver<String>,
}

impl StdioGateway {
    /// Create the gateway and spawn the stdin reader thread.
    pub fn new(device_id: &str) -> Self {
        let (tx, inbound) = unbounded();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) if line.trim().is_empty() => continue,
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
        Self {
            device_id: device_id.to_string(),
            inbound,
        }
    }
}

impl MessagingGateway for StdioGateway {
    fn is_connected(&self) -> bool {
        true
    }

    fn connect(&self) -> Result<()> {
        Ok(())
    }

    fn poll_inbound(&self) -> Option<String> {
        self.inbound.try_recv().ok()
    }

    fn publish(&self, topic: Topic, payload: &str) -> Result<()> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .unwrap_or_else(|_| serde_json::Value::String(payload.to_string()));
        let line = serde_json::json!({
            "topic": topic.route(&self.device_id),
            "payload": value,
        });
        // A broken stdout pipe degrades like any other transient publish
        // failure instead of panicking.
        writeln!(std::io::stdout(), "{}", line).map_err(|e| LumenError::Publish {
            topic: topic.as_str().to_string(),
            message: e.to_string(),
        })
    }
}

/// Scriptable gateway for tests.
#[derive(Debug, Default)]
pub struct MockGateway {
    connected: AtomicBool,
    refuse_connect: AtomicBool,
    inbound: Mutex<VecDeque<String>>,
    published: Mutex<Vec<(Topic, String)>>,
}

impl MockGateway {
    /// Create a connected mock gateway.
    pub fn new() -> Self {
        let gateway = Self::default();
        gateway.connected.store(true, Ordering::Relaxed);
        gateway
    }

    /// Create a mock gateway that starts disconnected.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Force the connection state.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Make subsequent `connect` calls fail until cleared.
    pub fn refuse_connect(&self, refuse: bool) {
        self.refuse_connect.store(refuse, Ordering::Relaxed);
    }

    /// Queue an inbound payload.
    pub fn push_inbound(&self, payload: &str) {
        self.inbound.lock().unwrap().push_back(payload.to_string());
    }

    /// Everything published so far, in order.
    pub fn published(&self) -> Vec<(Topic, String)> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads published to one topic, in order.
    pub fn published_on(&self, topic: Topic) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Drop everything published so far.
    pub fn clear_published(&self) {
        self.published.lock().unwrap().clear();
    }
}

impl MessagingGateway for MockGateway {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn connect(&self) -> Result<()> {
        if self.refuse_connect.load(Ordering::Relaxed) {
            return Err(LumenError::GatewayDisconnected);
        }
        self.connected.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn poll_inbound(&self) -> Option<String> {
        if !self.is_connected() {
            return None;
        }
        self.inbound.lock().unwrap().pop_front()
    }

    fn publish(&self, topic: Topic, payload: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(LumenError::GatewayDisconnected);
        }
        self.published
            .lock()
            .unwrap()
            .push((topic, payload.to_string()));
        Ok(())
    }
}
