//! # Lifecycle notification contract.
//!
//! A [`Listener`] is registered against a subsystem name and is told, in
//! group order, when that subsystem is about to be shut down or powered up
//! (and when each phase has finished). Delivery is synchronous: the restart
//! worker awaits every listener before proceeding to the next step, so a
//! listener can quiesce its own use of the subsystem before the firmware
//! goes away.
//!
//! Listener failures are observational. They are surfaced to the dispatch
//! caller and reported on the event bus, but they never gate recovery.

use async_trait::async_trait;
use thiserror::Error;

/// Notification phases delivered around the restart sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The group is about to be shut down.
    BeforeShutdown,
    /// Every present member of the group has been shut down.
    AfterShutdown,
    /// The group is about to be powered back up.
    BeforePowerup,
    /// Every present member of the group is online again.
    AfterPowerup,
}

impl Phase {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeShutdown => "before_shutdown",
            Phase::AfterShutdown => "after_shutdown",
            Phase::BeforePowerup => "before_powerup",
            Phase::AfterPowerup => "after_powerup",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by a listener. Logged, never propagated as an
/// orchestration failure.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct NotifyError {
    /// Human-readable description of the listener failure.
    pub message: String,
}

impl NotifyError {
    /// Creates a new listener error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Contract for lifecycle listeners.
///
/// Called from the restart worker. Implementations should avoid long blocking
/// work: every listener of every group member is awaited before the sequence
/// moves on.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one lifecycle phase for the subsystem the listener is
    /// registered against.
    async fn on_phase(&self, phase: Phase, subsystem: &str) -> Result<(), NotifyError>;

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
