//! JSON envelopes exchanged over the messaging boundary.
//!
//! Inbound commands arrive as [`CommandEnvelope`]; everything outbound is a
//! read-only projection of device state plus metadata. Field names are
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

/// Current time as epoch milliseconds, the timestamp unit of every envelope.
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Inbound command envelope.
///
/// A payload that fails to deserialize into this shape is logged and
/// dropped without a response; only recognized-but-invalid commands get an
/// error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandEnvelope {
    pub command: String,
    #[serde(default)]
    pub request_id: String,
}

impl CommandEnvelope {
    /// Deserialize an envelope from a JSON payload.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

/// Outbound response to a dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub device_id: String,
    pub command: String,
    pub request_id: String,
    pub success: bool,
    /// Power state after dispatch, "on" or "off".
    pub status: String,
    pub timestamp: u64,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outbound status snapshot, broadcast on transitions and on request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    pub device_id: String,
    pub status: String,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub voice_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Periodic liveness broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatEnvelope {
    pub device_id: String,
    pub name: String,
    pub status: String,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub voice_enabled: bool,
}

/// Announcement published once per established connection: at startup when
/// the gateway is already live, and after each successful reconnect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEnvelope {
    pub device_id: String,
    pub name: String,
    pub status: String,
    pub timestamp: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub capabilities: Vec<String>,
}

impl RegistrationEnvelope {
    /// Build the registration announcement for this device.
    pub fn new(device_id: &str, name: &str, status: &str, timestamp: u64) -> Self {
        Self {
            device_id: device_id.to_string(),
            name: name.to_string(),
            status: status.to_string(),
            timestamp,
            kind: "registration".to_string(),
            capabilities: vec![
                "relay_control".to_string(),
                "voice_commands".to_string(),
                "audio_feedback".to_string(),
            ],
        }
    }
}

/// Notification that the voice pipeline dispatched a command on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceEventEnvelope {
    pub device_id: String,
    pub action: String,
    pub timestamp: u64,
    pub source: String,
    pub request_id: String,
}

/// Serialize any outbound envelope to its JSON payload.
pub fn encode<T: Serialize>(envelope: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(envelope)
}
