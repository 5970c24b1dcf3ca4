//! # subvisor
//!
//! Restart coordination for crashed hardware/firmware subsystems.
//!
//! Embedded platforms run firmware on several co-processors (modem, audio
//! DSP, sensor hub). When one of them crashes, the platform can often recover
//! by restarting just that subsystem, or the coupled set it shares state
//! with, instead of resetting the whole device. `subvisor` implements the
//! coordination: the registry, the per-group shutdown/powerup protocol,
//! crash-loop detection, lifecycle notifications, and the escalation path to
//! a full platform reset.
//!
//! ## Architecture
//! ```text
//!             crash report (request_restart)
//!                        │ atomic claim
//!                        ▼
//!  ┌─────────────────────────────────────────────────────────┐
//!  │ Coordinator                                             │
//!  │   handles ──► SubsystemHandle (state machine)           │
//!  │   platform tables ──► RestartGroup (order + lock pair)  │
//!  │   policy / crash log / ramdump switch                   │
//!  └───────┬──────────────────────────────────┬──────────────┘
//!          │ spawn                            │ fatal
//!          ▼                                  ▼
//!   restart worker                      FatalChannel ──► FatalHook
//!   shutdown → ramdump → powerup              │
//!          │                                  │
//!          ▼                                  ▼
//!   Notifier (ordered listeners)       Bus ──► SubscriberSet
//! ```
//!
//! Two observation surfaces exist on purpose:
//! - [`Listener`]s are synchronous with the sequence, delivered in group
//!   order, so clients of a subsystem can quiesce before its firmware goes
//!   away;
//! - [`Subscribe`]rs ride the event [`Bus`] asynchronously and can be slow or
//!   lossy without affecting recovery.
//!
//! ## Quick start
//! ```no_run
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use subvisor::{
//!     CoordinatorBuilder, PlatformConfig, RestartLevel, RestartPolicy, Subsystem,
//!     SubsystemError,
//! };
//!
//! struct Modem;
//!
//! #[async_trait]
//! impl Subsystem for Modem {
//!     fn name(&self) -> &str {
//!         "modem"
//!     }
//!     async fn shutdown(&self) -> Result<(), SubsystemError> {
//!         Ok(())
//!     }
//!     async fn powerup(&self) -> Result<(), SubsystemError> {
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let coordinator = CoordinatorBuilder::new()
//!         .with_platform(PlatformConfig::new("demo").with_order("modems", &["modem"]))
//!         .with_policy(RestartPolicy {
//!             level: RestartLevel::Coupled,
//!             ..RestartPolicy::default()
//!         })
//!         .build()?;
//!
//!     let handle = coordinator.register(Arc::new(Modem)).await?;
//!     coordinator.request_restart(&handle)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//! - `logging` — enables [`LogWriter`], a stdout subscriber for demos and
//!   debugging.

pub mod error;
pub mod events;

mod core;
mod epoch;
mod fatal;
mod groups;
mod notify;
mod policy;
mod subscribers;
mod subsystems;

pub use crate::core::{
    Coordinator, CoordinatorBuilder, CoordinatorConfig, SubsystemInfo, MAX_NAME_LEN,
};
pub use crate::error::{FatalError, RequestError, SubsystemError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::fatal::FatalHook;
pub use crate::groups::{PlatformConfig, RestartGroup};
pub use crate::notify::{Listener, NotifyError, NotifyFailure, Phase};
pub use crate::policy::{RestartLevel, RestartPolicy};
pub use crate::subscribers::{Subscribe, SubscriberSet};
pub use crate::subsystems::{Subsystem, SubsystemHandle, SubsystemRef, SubsystemState};

#[cfg(feature = "logging")]
pub use crate::subscribers::LogWriter;
