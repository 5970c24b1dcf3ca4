//! Subsystem abstraction: callback contract, lifecycle state, and the
//! coordinator-side handle.

mod handle;
mod state;
mod subsystem;

pub(crate) use handle::ClaimOutcome;
pub use handle::SubsystemHandle;
pub use state::SubsystemState;
pub use subsystem::{Subsystem, SubsystemRef};
