//! # Global coordinator configuration.
//!
//! Provides [`CoordinatorConfig`], the centralized settings for the restart
//! coordinator runtime.
//!
//! ## Sentinel values
//! - `max_subsystems = 0` → unlimited (registration never returns
//!   `Exhausted`)
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use crate::policy::RestartPolicy;

/// Global configuration for the restart coordinator.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the bus)
/// - `max_subsystems`: registry capacity (`0` = unlimited)
/// - `enable_ramdumps`: initial value of the operator's ramdump switch
///   (runtime-togglable via the coordinator)
/// - `policy`: initial restart policy (level + crash-loop tunables)
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Maximum number of registered subsystems.
    ///
    /// - `0` = unlimited
    /// - `n > 0` = registration fails with `Exhausted` once reached
    pub max_subsystems: usize,

    /// Whether ramdump collection starts enabled.
    ///
    /// Passed to every subsystem's `ramdump(enable)` callback during
    /// recovery; togglable at runtime.
    pub enable_ramdumps: bool,

    /// Initial restart policy.
    ///
    /// Validated against the platform configuration at build time the same
    /// way `set_policy` validates later changes.
    pub policy: RestartPolicy,
}

impl CoordinatorConfig {
    /// Returns the registry capacity as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` registered subsystems
    #[inline]
    pub fn capacity_limit(&self) -> Option<usize> {
        if self.max_subsystems == 0 {
            None
        } else {
            Some(self.max_subsystems)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for CoordinatorConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024` (good baseline)
    /// - `max_subsystems = 0` (unlimited)
    /// - `enable_ramdumps = false`
    /// - `policy = RestartPolicy::default()` (full reset, detector disabled)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_subsystems: 0,
            enable_ramdumps: false,
            policy: RestartPolicy::default(),
        }
    }
}
