//! Coordinator core: builder, configuration, the public API surface, and the
//! restart worker.

mod builder;
mod config;
mod coordinator;
mod sequence;

pub use builder::CoordinatorBuilder;
pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, SubsystemInfo, MAX_NAME_LEN};
