//! Symbolic commands and the dispatcher they funnel through.

pub mod dispatcher;
pub mod types;

pub use dispatcher::Dispatcher;
pub use types::{Action, CommandSource, SymbolicCommand};
