//! Relay switch seam.
//!
//! On target hardware this drives a GPIO pin; on a development host the
//! [`LogRelay`] just records transitions in the log. The trait allows
//! swapping implementations (real relay vs mock).

use crate::device::state::PowerState;
use crate::error::Result;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Trait for the physical relay output.
pub trait RelaySwitch: Send {
    /// Drive the relay to the given power state.
    ///
    /// Called on every TurnOn/TurnOff dispatch, including idempotent ones
    /// where the state already matches.
    fn set_power(&mut self, power: PowerState) -> Result<()>;
}

/// Relay that only logs transitions; used when no GPIO is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRelay;

impl RelaySwitch for LogRelay {
    fn set_power(&mut self, power: PowerState) -> Result<()> {
        info!(state = power.as_str(), "relay switched");
        Ok(())
    }
}

/// Mock relay for tests; records every transition.
#[derive(Debug, Clone, Default)]
pub struct MockRelay {
    transitions: Arc<Mutex<Vec<PowerState>>>,
    fail: bool,
}

impl MockRelay {
    /// Create a new mock relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail on every switch.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }

    /// All transitions requested so far, in order.
    pub fn transitions(&self) -> Vec<PowerState> {
        self.transitions.lock().unwrap().clone()
    }

    /// The most recent transition, if any.
    pub fn last(&self) -> Option<PowerState> {
        self.transitions.lock().unwrap().last().copied()
    }
}

impl RelaySwitch for MockRelay {
    fn set_power(&mut self, power: PowerState) -> Result<()> {
        if self.fail {
            return Err(crate::error::LumenError::Relay {
                message: "mock relay failure".to_string(),
            });
        }
        self.transitions.lock().unwrap().push(power);
        Ok(())
    }
}
