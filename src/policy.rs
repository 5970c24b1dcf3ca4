//! # Restart policy: global recovery level and crash-loop tunables.
//!
//! [`RestartLevel`] selects among the three recovery strategies:
//!
//! - [`RestartLevel::FullReset`] — every crash resets the whole platform
//!   (default, the conservative choice).
//! - [`RestartLevel::Coupled`] — the crashed subsystem restarts together with
//!   its resolved restart group.
//! - [`RestartLevel::Independent`] — every subsystem restarts as its own
//!   singleton group, ignoring group resolution.
//!
//! [`RestartPolicy`] bundles the level with the crash-loop detector tunables.
//! Policy changes take effect for subsequent restart requests only; a
//! sequence already in flight is never retroactively affected.

use std::time::Duration;

/// Strategy applied when a subsystem crash is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartLevel {
    /// Restart the crashed subsystem alone, ignoring restart groups.
    Independent,
    /// Restart the crashed subsystem together with its restart group.
    Coupled,
    /// Escalate every crash to a full platform reset.
    FullReset,
}

impl RestartLevel {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RestartLevel::Independent => "independent",
            RestartLevel::Coupled => "coupled",
            RestartLevel::FullReset => "full_reset",
        }
    }
}

impl std::fmt::Display for RestartLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Global, operator-configurable restart policy.
///
/// ## Field semantics
/// - `max_restarts`: crash-loop threshold; `0` disables the detector entirely
///   (every restart always proceeds).
/// - `window`: sliding time window the threshold is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Active recovery strategy.
    pub level: RestartLevel,
    /// Maximum restarts tolerated inside `window` before escalating.
    pub max_restarts: u32,
    /// Length of the crash-loop detection window.
    pub window: Duration,
}

impl Default for RestartPolicy {
    /// Returns the platform's conservative defaults:
    ///
    /// - `level = FullReset`
    /// - `max_restarts = 0` (detector disabled)
    /// - `window = 3600s`
    fn default() -> Self {
        Self {
            level: RestartLevel::FullReset,
            max_restarts: 0,
            window: Duration::from_secs(3600),
        }
    }
}
