//! # Subsystem abstraction: the callback contract supplied at registration.
//!
//! This module defines the [`Subsystem`] trait, the capability set every
//! managed firmware subsystem exposes to the coordinator. The common handle
//! type is [`SubsystemRef`], an `Arc<dyn Subsystem>` suitable for sharing
//! across the runtime.
//!
//! The coordinator never loads firmware or sequences power rails itself; it
//! only invokes these callbacks in the order the restart protocol requires.
//!
//! ## Example
//! ```
//! use async_trait::async_trait;
//! use subvisor::{Subsystem, SubsystemError};
//!
//! struct Modem;
//!
//! #[async_trait]
//! impl Subsystem for Modem {
//!     fn name(&self) -> &str { "modem" }
//!
//!     async fn shutdown(&self) -> Result<(), SubsystemError> {
//!         // halt the firmware, mask interrupts...
//!         Ok(())
//!     }
//!
//!     async fn powerup(&self) -> Result<(), SubsystemError> {
//!         // reload and boot the firmware image...
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SubsystemError;

/// Shared handle to a subsystem implementation.
pub type SubsystemRef = Arc<dyn Subsystem>;

/// # Callback set of one managed subsystem.
///
/// `shutdown` and `powerup` are required; a failure in either is treated as
/// platform-fatal by the orchestrator. `ramdump` and `crash_shutdown` are
/// optional and default to "not supported" / no-op.
#[async_trait]
pub trait Subsystem: Send + Sync + 'static {
    /// Returns the stable, unique subsystem name.
    fn name(&self) -> &str;

    /// Cleanly halts the subsystem's firmware.
    ///
    /// Invoked with the group's shutdown lock held, in group order. An error
    /// here escalates to platform-fatal: a subsystem that cannot be shut down
    /// cleanly cannot be trusted to restart.
    async fn shutdown(&self) -> Result<(), SubsystemError>;

    /// Boots the subsystem's firmware back up.
    ///
    /// Invoked after every member of the group has been shut down. An error
    /// here escalates to platform-fatal.
    async fn powerup(&self) -> Result<(), SubsystemError>;

    /// Captures a diagnostic memory dump after shutdown, before powerup.
    ///
    /// `enable` mirrors the operator's ramdump switch. Best-effort: a
    /// [`SubsystemError::Failed`] is reported but does not abort recovery,
    /// and the default [`SubsystemError::Unsupported`] is skipped silently.
    async fn ramdump(&self, enable: bool) -> Result<(), SubsystemError> {
        let _ = enable;
        Err(SubsystemError::Unsupported)
    }

    /// Last-resort halt invoked synchronously from the platform-fatal path.
    ///
    /// Called on every registered subsystem before the fatal hook fires. No
    /// failure handling is possible at that point, so this returns nothing
    /// and must not block.
    fn crash_shutdown(&self) {}
}
