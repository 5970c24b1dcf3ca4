//! # Subsystem handle: the coordinator's mutable record for one subsystem.
//!
//! A [`SubsystemHandle`] pairs the registered callback set with the restart
//! state machine of that subsystem:
//!
//! ```text
//!                 claim_restart()            shutdown          powerup
//!   Online ───────────────────────► Crashed ────────► Offline ───────► Online
//!     │  restarting = true                                    restarting = false
//!     │                                                       (finish_restart)
//!     └─ second claim while Crashed/restarting ──► fatal
//! ```
//!
//! ## Rules
//! - `state` and `restarting` change only under one short critical section
//!   keyed by the handle, never by the group. Reporting crashes on two
//!   different members of the same group therefore never silently drops one.
//! - `restarting` distinguishes "crash acknowledged, worker queued" from
//!   "crash detected but not yet claimed". It is cleared in exactly one
//!   place: [`SubsystemHandle::finish_restart`].
//! - The handle owns a private shutdown/powerup lock pair used when the
//!   subsystem restarts as a singleton (no group, or the Independent level).
//! - `Arc<SubsystemHandle>` is the reference count keeping the record alive
//!   while a restart is in flight.

use std::sync::{Arc, Mutex};

use crate::groups::{RestartGroup, RestartLocks};
use crate::subsystems::state::SubsystemState;
use crate::subsystems::subsystem::SubsystemRef;

/// Outcome of an atomic restart claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClaimOutcome {
    /// The crash was claimed; the caller must schedule the restart worker.
    Claimed,
    /// The handle is offline/torn down; the request is rejected as not found.
    Offline,
    /// The subsystem was already `Crashed` or `restarting`: an overlapping
    /// crash report, which is platform-fatal.
    Fatal,
}

/// State protected by the handle's critical section.
#[derive(Debug)]
struct RestartFlags {
    state: SubsystemState,
    restarting: bool,
}

/// The coordinator's record for one registered subsystem.
pub struct SubsystemHandle {
    id: u64,
    name: Arc<str>,
    subsystem: SubsystemRef,
    flags: Mutex<RestartFlags>,
    group: Option<Arc<RestartGroup>>,
    locks: RestartLocks,
}

impl SubsystemHandle {
    /// Creates a handle in the `Online` state.
    pub(crate) fn new(id: u64, subsystem: SubsystemRef, group: Option<Arc<RestartGroup>>) -> Self {
        let name = Arc::from(subsystem.name());
        Self {
            id,
            name,
            subsystem,
            flags: Mutex::new(RestartFlags {
                state: SubsystemState::Online,
                restarting: false,
            }),
            group,
            locks: RestartLocks::new(),
        }
    }

    /// Returns the unique registration id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the subsystem name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SubsystemState {
        self.flags.lock().expect("restart flags poisoned").state
    }

    /// Returns true while a claimed restart has not completed yet.
    pub fn is_restarting(&self) -> bool {
        self.flags.lock().expect("restart flags poisoned").restarting
    }

    /// Returns the resolved restart group, if any.
    pub fn group(&self) -> Option<&Arc<RestartGroup>> {
        self.group.as_ref()
    }

    pub(crate) fn subsystem(&self) -> &SubsystemRef {
        &self.subsystem
    }

    /// The private lock pair used on the singleton restart path.
    pub(crate) fn own_locks(&self) -> &RestartLocks {
        &self.locks
    }

    /// Atomic check-and-set of the restart state machine.
    ///
    /// Reads `state`, and if `Online` and not already `restarting`,
    /// transitions to `Crashed` and marks the restart claimed, all under one
    /// critical section.
    pub(crate) fn claim_restart(&self) -> ClaimOutcome {
        let mut flags = self.flags.lock().expect("restart flags poisoned");
        match flags.state {
            SubsystemState::Online if !flags.restarting => {
                flags.state = SubsystemState::Crashed;
                flags.restarting = true;
                ClaimOutcome::Claimed
            }
            SubsystemState::Offline => ClaimOutcome::Offline,
            _ => ClaimOutcome::Fatal,
        }
    }

    /// Clears the `restarting` flag at the end of a completed sequence.
    pub(crate) fn finish_restart(&self) {
        self.flags
            .lock()
            .expect("restart flags poisoned")
            .restarting = false;
    }

    /// Sets the lifecycle state, returning true if the value changed.
    pub(crate) fn set_state(&self, state: SubsystemState) -> bool {
        let mut flags = self.flags.lock().expect("restart flags poisoned");
        if flags.state != state {
            flags.state = state;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for SubsystemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubsystemHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("restarting", &self.is_restarting())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubsystemError;
    use async_trait::async_trait;

    struct Noop(&'static str);

    #[async_trait]
    impl crate::subsystems::Subsystem for Noop {
        fn name(&self) -> &str {
            self.0
        }
        async fn shutdown(&self) -> Result<(), SubsystemError> {
            Ok(())
        }
        async fn powerup(&self) -> Result<(), SubsystemError> {
            Ok(())
        }
    }

    fn handle() -> SubsystemHandle {
        SubsystemHandle::new(1, Arc::new(Noop("modem")), None)
    }

    #[test]
    fn test_claim_from_online_succeeds_once() {
        let h = handle();
        assert_eq!(h.claim_restart(), ClaimOutcome::Claimed);
        assert_eq!(h.state(), SubsystemState::Crashed);
        assert!(h.is_restarting());
    }

    #[test]
    fn test_second_claim_is_fatal() {
        let h = handle();
        assert_eq!(h.claim_restart(), ClaimOutcome::Claimed);
        assert_eq!(h.claim_restart(), ClaimOutcome::Fatal);
    }

    #[test]
    fn test_claim_while_offline_is_rejected() {
        let h = handle();
        h.set_state(SubsystemState::Offline);
        assert_eq!(h.claim_restart(), ClaimOutcome::Offline);
    }

    #[test]
    fn test_finish_restart_clears_flag_only() {
        let h = handle();
        h.claim_restart();
        h.set_state(SubsystemState::Online);
        h.finish_restart();
        assert!(!h.is_restarting());
        assert_eq!(h.claim_restart(), ClaimOutcome::Claimed);
    }
}
