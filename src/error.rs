//! Error types used by the restart coordinator and subsystem callbacks.
//!
//! This module defines three error enums, one per class of the coordinator's
//! error taxonomy:
//!
//! - [`SubsystemError`] — failures reported by a subsystem's own callbacks.
//! - [`RequestError`] — requests rejected synchronously at the API boundary.
//! - [`FatalError`] — platform-fatal conditions that cannot be recovered at
//!   this layer and are raised through the fatal channel.
//!
//! All types provide `as_label()` for logs/metrics; [`FatalError`] additionally
//! provides `as_message()` with full details.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by subsystem callbacks.
///
/// Returned by `shutdown`, `powerup`, and `ramdump` implementations.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SubsystemError {
    /// The callback ran and failed.
    #[error("callback failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The subsystem does not implement this (optional) callback.
    ///
    /// The orchestrator treats this as "skip", not as a failure.
    #[error("callback not supported")]
    Unsupported,
}

impl SubsystemError {
    /// Convenience constructor for [`SubsystemError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        SubsystemError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SubsystemError::Failed { .. } => "subsystem_failed",
            SubsystemError::Unsupported => "subsystem_unsupported",
        }
    }
}

/// # Requests rejected by the coordinator.
///
/// These are returned synchronously to the caller and never escalate.
/// A rejected request has no effect on any subsystem.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No registered subsystem matches the given name, or the handle is
    /// already offline/torn down.
    #[error("subsystem not found: {name}")]
    NotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// The subsystem has a restart in flight; the operation would corrupt
    /// state mid-sequence.
    #[error("subsystem busy (restart in flight): {name}")]
    Busy {
        /// Name of the busy subsystem.
        name: String,
    },

    /// The subsystem name is empty or exceeds the maximum length.
    #[error("invalid subsystem name: {name:?}")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// A subsystem with this name is already registered.
    #[error("subsystem already registered: {name}")]
    AlreadyRegistered {
        /// The duplicate name.
        name: String,
    },

    /// The registry reached its configured capacity.
    #[error("subsystem registry exhausted (limit {limit})")]
    Exhausted {
        /// The configured registry limit.
        limit: usize,
    },

    /// The requested restart level is not permitted on this platform.
    #[error("restart level not allowed: {value}")]
    InvalidLevel {
        /// Textual form of the rejected level.
        value: String,
    },
}

impl RequestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestError::NotFound { .. } => "request_not_found",
            RequestError::Busy { .. } => "request_busy",
            RequestError::InvalidName { .. } => "request_invalid_name",
            RequestError::AlreadyRegistered { .. } => "request_already_registered",
            RequestError::Exhausted { .. } => "request_exhausted",
            RequestError::InvalidLevel { .. } => "request_invalid_level",
        }
    }
}

/// # Platform-fatal conditions.
///
/// These cannot be handled by the coordinator: recovery of the crashed group
/// is no longer safe and the whole platform must reset. They are raised
/// exactly once through the fatal channel and are never retried.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum FatalError {
    /// A subsystem crashed again before its previous restart reached the
    /// shutdown phase. The recovery sequence itself is broken.
    #[error("subsystem {subsystem} crashed during restart")]
    CrashedDuringRestart {
        /// Name of the twice-crashed subsystem.
        subsystem: String,
    },

    /// The powerup lock was unavailable right after a fresh shutdown claim:
    /// a subsystem in the group died during its own powerup sequence.
    #[error("subsystem {subsystem} died during powerup")]
    DiedDuringPowerup {
        /// Name of the subsystem that triggered the fresh claim.
        subsystem: String,
    },

    /// A shutdown callback failed. A subsystem that cannot be shut down
    /// cleanly cannot be trusted to restart.
    #[error("failed to shut down {subsystem}: {error}")]
    ShutdownFailed {
        /// Name of the subsystem whose shutdown failed.
        subsystem: String,
        /// The callback error.
        error: SubsystemError,
    },

    /// A powerup callback failed.
    #[error("failed to power up {subsystem}: {error}")]
    PowerupFailed {
        /// Name of the subsystem whose powerup failed.
        subsystem: String,
        /// The callback error.
        error: SubsystemError,
    },

    /// Too many restarts inside the sliding window: the platform is
    /// crash-looping and further recovery attempts are pointless.
    #[error("subsystems have crashed {count} times in less than {window:?}")]
    CrashLoop {
        /// Number of restarts observed inside the window.
        count: usize,
        /// The configured window length.
        window: Duration,
    },

    /// The active restart level mandates a full platform reset for every
    /// crash.
    #[error("full platform reset: {subsystem} crashed")]
    LevelForcedReset {
        /// Name of the crashed subsystem.
        subsystem: String,
    },
}

impl FatalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FatalError::CrashedDuringRestart { .. } => "fatal_crashed_during_restart",
            FatalError::DiedDuringPowerup { .. } => "fatal_died_during_powerup",
            FatalError::ShutdownFailed { .. } => "fatal_shutdown_failed",
            FatalError::PowerupFailed { .. } => "fatal_powerup_failed",
            FatalError::CrashLoop { .. } => "fatal_crash_loop",
            FatalError::LevelForcedReset { .. } => "fatal_level_forced_reset",
        }
    }

    /// Returns the subsystem the condition is attributable to, if any.
    pub fn subsystem(&self) -> Option<&str> {
        match self {
            FatalError::CrashedDuringRestart { subsystem }
            | FatalError::DiedDuringPowerup { subsystem }
            | FatalError::ShutdownFailed { subsystem, .. }
            | FatalError::PowerupFailed { subsystem, .. }
            | FatalError::LevelForcedReset { subsystem } => Some(subsystem),
            FatalError::CrashLoop { .. } => None,
        }
    }

    /// Returns a human-readable message with details about the condition.
    pub fn as_message(&self) -> String {
        match self {
            FatalError::CrashedDuringRestart { subsystem } => {
                format!("{subsystem} crashed while its restart was still in flight")
            }
            FatalError::DiedDuringPowerup { subsystem } => {
                format!("{subsystem} claimed a shutdown while the group powerup was unfinished")
            }
            FatalError::ShutdownFailed { subsystem, error } => {
                format!("shutdown of {subsystem} failed: {error}")
            }
            FatalError::PowerupFailed { subsystem, error } => {
                format!("powerup of {subsystem} failed: {error}")
            }
            FatalError::CrashLoop { count, window } => {
                format!("{count} restarts in less than {window:?}")
            }
            FatalError::LevelForcedReset { subsystem } => {
                format!("restart level forces a platform reset ({subsystem} crashed)")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        let err = RequestError::Busy {
            name: "modem".into(),
        };
        assert_eq!(err.as_label(), "request_busy");

        let err = FatalError::CrashLoop {
            count: 3,
            window: Duration::from_secs(60),
        };
        assert_eq!(err.as_label(), "fatal_crash_loop");
        assert!(err.as_message().contains("3 restarts"));
    }
}
