//! Symbolic command types shared by the voice path and the message channel.

/// The action a command resolves to.
///
/// `Unknown` keeps the raw command string so error responses can echo it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TurnOn,
    TurnOff,
    GetStatus,
    EnableVoice,
    DisableVoice,
    Unknown(String),
}

impl Action {
    /// Parse a wire command string.
    ///
    /// Anything outside the known vocabulary becomes `Unknown`: a
    /// recognized-but-invalid command that gets a failure response, as
    /// opposed to a malformed envelope which is dropped entirely.
    pub fn parse(command: &str) -> Self {
        match command {
            "turn_on" => Action::TurnOn,
            "turn_off" => Action::TurnOff,
            "get_status" => Action::GetStatus,
            "enable_voice" => Action::EnableVoice,
            "disable_voice" => Action::DisableVoice,
            other => Action::Unknown(other.to_string()),
        }
    }

    /// The wire name echoed in response envelopes.
    pub fn wire_name(&self) -> &str {
        match self {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
            Action::GetStatus => "get_status",
            Action::EnableVoice => "enable_voice",
            Action::DisableVoice => "disable_voice",
            Action::Unknown(raw) => raw,
        }
    }
}

/// Where a command came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    /// Inbound message-channel envelope.
    Channel,
    /// On-device voice pipeline.
    Voice,
}

impl CommandSource {
    /// Wire representation used in outbound envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandSource::Channel => "channel",
            CommandSource::Voice => "voice",
        }
    }
}

/// A fully-resolved command ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicCommand {
    pub action: Action,
    pub source: CommandSource,
    /// Correlation identifier; opaque, echoed back in the response.
    pub request_id: String,
}

impl SymbolicCommand {
    /// Command arriving over the message channel.
    pub fn from_channel(command: &str, request_id: String) -> Self {
        Self {
            action: Action::parse(command),
            source: CommandSource::Channel,
            request_id,
        }
    }

    /// Command produced by the voice pipeline.
    pub fn from_voice(action: Action, request_id: String) -> Self {
        Self {
            action,
            source: CommandSource::Voice,
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_full_wire_vocabulary() {
        assert_eq!(Action::parse("turn_on"), Action::TurnOn);
        assert_eq!(Action::parse("turn_off"), Action::TurnOff);
        assert_eq!(Action::parse("get_status"), Action::GetStatus);
        assert_eq!(Action::parse("enable_voice"), Action::EnableVoice);
        assert_eq!(Action::parse("disable_voice"), Action::DisableVoice);
    }

    #[test]
    fn unknown_commands_keep_their_raw_name() {
        let action = Action::parse("self_destruct");
        assert_eq!(action, Action::Unknown("self_destruct".to_string()));
        assert_eq!(action.wire_name(), "self_destruct");
    }

    #[test]
    fn wire_names_round_trip() {
        for name in [
            "turn_on",
            "turn_off",
            "get_status",
            "enable_voice",
            "disable_voice",
        ] {
            assert_eq!(Action::parse(name).wire_name(), name);
        }
    }

    #[test]
    fn source_strings() {
        assert_eq!(CommandSource::Channel.as_str(), "channel");
        assert_eq!(CommandSource::Voice.as_str(), "voice");
    }
}
