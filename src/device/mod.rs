//! Device-side collaborators: relay switching and power-state persistence.

pub mod persistence;
pub mod relay;
pub mod state;

pub use persistence::{FileStateStore, MockStateStore, StateStore};
pub use relay::{LogRelay, MockRelay, RelaySwitch};
pub use state::PowerState;
