//! Event system: bus and event types.
//!
//! Internal modules:
//! - `bus`: broadcast channel wrapper for non-blocking publishing;
//! - `event`: event struct and kind classification.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
