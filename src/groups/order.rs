//! # Restart groups: coupled subsystems that shut down and power up together.
//!
//! A [`RestartGroup`] is an ordered, fixed-size list of member slots plus the
//! two locks that serialize recovery of the whole group:
//!
//! ```text
//!              ┌────────────────────────────────────┐
//!              │ RestartGroup "modems"              │
//!              │  slots: [external_modem] [modem]   │  ← fixed order from
//!              │  shutdown lock   powerup lock      │    platform tables
//!              └────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Slot order is fixed by the platform table; members are attached lazily
//!   as they register. Empty slots are valid and skipped during orchestration.
//! - A subsystem belongs to at most one group.
//! - Both locks are only ever acquired with a non-blocking try-acquire; the
//!   named outcomes (`no-op`, `proceed`, `fatal`) are decided by the restart
//!   worker, never by blocking.
//! - Slots hold weak references; the registry's handle map owns the strong
//!   ones.

use std::sync::{Arc, RwLock, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::subsystems::SubsystemHandle;

/// The shutdown/powerup lock pair guarding one restart scope.
///
/// Every [`RestartGroup`] carries a pair, and every handle carries its own
/// private pair for the singleton path (no group, or the Independent level).
#[derive(Debug)]
pub(crate) struct RestartLocks {
    shutdown: Arc<Mutex<()>>,
    powerup: Arc<Mutex<()>>,
}

impl RestartLocks {
    pub(crate) fn new() -> Self {
        Self {
            shutdown: Arc::new(Mutex::new(())),
            powerup: Arc::new(Mutex::new(())),
        }
    }

    /// Tries to claim the shutdown phase. `None` means another in-flight
    /// restart already owns it.
    pub(crate) fn try_shutdown(&self) -> Option<OwnedMutexGuard<()>> {
        self.shutdown.clone().try_lock_owned().ok()
    }

    /// Tries to claim the powerup phase. `None` after a successful shutdown
    /// claim means a previous restart's powerup is still unfinished.
    pub(crate) fn try_powerup(&self) -> Option<OwnedMutexGuard<()>> {
        self.powerup.clone().try_lock_owned().ok()
    }
}

/// One member position inside a group.
struct Slot {
    name: Arc<str>,
    handle: RwLock<Weak<SubsystemHandle>>,
}

/// An ordered set of subsystems that must restart together.
pub struct RestartGroup {
    name: Arc<str>,
    slots: Vec<Slot>,
    locks: RestartLocks,
}

impl RestartGroup {
    /// Creates a group with the given member order and empty slots.
    pub(crate) fn new(name: impl Into<Arc<str>>, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            slots: members
                .iter()
                .map(|m| Slot {
                    name: Arc::from(*m),
                    handle: RwLock::new(Weak::new()),
                })
                .collect(),
            locks: RestartLocks::new(),
        }
    }

    /// Returns the group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured member names in restart order.
    pub fn member_names(&self) -> Vec<Arc<str>> {
        self.slots.iter().map(|s| s.name.clone()).collect()
    }

    /// Returns true if the group's table lists this subsystem name.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|s| &*s.name == name)
    }

    /// Fills the slot matching the handle's name.
    ///
    /// Returns false if the name is not part of this group. Attachment must
    /// happen before the handle becomes discoverable by name lookup so that a
    /// concurrent restart of a sibling never sees a stale member list.
    pub(crate) fn attach(&self, handle: &Arc<SubsystemHandle>) -> bool {
        match self.slots.iter().find(|s| &*s.name == handle.name()) {
            Some(slot) => {
                *slot.handle.write().expect("group slot lock poisoned") = Arc::downgrade(handle);
                true
            }
            None => false,
        }
    }

    /// Empties the slot for the given name (unregistration).
    pub(crate) fn detach(&self, name: &str) {
        if let Some(slot) = self.slots.iter().find(|s| &*s.name == name) {
            *slot.handle.write().expect("group slot lock poisoned") = Weak::new();
        }
    }

    /// Returns the present members in group order, skipping empty slots.
    pub(crate) fn members(&self) -> Vec<Arc<SubsystemHandle>> {
        self.slots
            .iter()
            .filter_map(|s| s.handle.read().expect("group slot lock poisoned").upgrade())
            .collect()
    }

    pub(crate) fn locks(&self) -> &RestartLocks {
        &self.locks
    }
}

impl std::fmt::Debug for RestartGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestartGroup")
            .field("name", &self.name)
            .field("members", &self.member_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_locks_are_exclusive() {
        let locks = RestartLocks::new();
        let held = locks.try_shutdown().expect("first claim succeeds");
        assert!(locks.try_shutdown().is_none());
        drop(held);
        assert!(locks.try_shutdown().is_some());
    }

    #[test]
    fn test_empty_slots_are_skipped() {
        let group = RestartGroup::new("modems", &["external_modem", "modem"]);
        assert!(group.contains("modem"));
        assert!(!group.contains("lpass"));
        assert!(group.members().is_empty());
    }
}
