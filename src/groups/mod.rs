//! Restart groups and the platform-table resolver.

mod order;
mod tables;

pub(crate) use order::RestartLocks;
pub use order::RestartGroup;
pub(crate) use tables::GroupTables;
pub use tables::PlatformConfig;
