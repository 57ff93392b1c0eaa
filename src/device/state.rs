//! Relay power state and its single-byte persisted form.

/// Power state of the controlled relay.
///
/// Mutated exclusively by the command dispatcher; everything else reads it
/// through accessors or envelope snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    Off,
}

impl PowerState {
    /// Wire/status representation, as reported in outbound envelopes.
    pub fn as_str(self) -> &'static str {
        match self {
            PowerState::On => "on",
            PowerState::Off => "off",
        }
    }

    /// Persisted representation: one byte, 1 = On, 0 = Off.
    pub fn to_byte(self) -> u8 {
        match self {
            PowerState::On => 1,
            PowerState::Off => 0,
        }
    }

    /// Decode the persisted byte. Anything other than 1 reads as Off.
    pub fn from_byte(byte: u8) -> Self {
        if byte == 1 {
            PowerState::On
        } else {
            PowerState::Off
        }
    }
}

impl std::fmt::Display for PowerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
