//! Messaging boundary: JSON envelopes and the gateway that carries them.

pub mod envelope;
pub mod gateway;

pub use envelope::{
    CommandEnvelope, HeartbeatEnvelope, RegistrationEnvelope, ResponseEnvelope, StatusEnvelope,
    VoiceEventEnvelope, now_ms,
};
pub use gateway::{ChannelGateway, GatewayHarness, MessagingGateway, MockGateway, Topic};
