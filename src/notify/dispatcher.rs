//! # Ordered, synchronous fan-out of lifecycle phases.
//!
//! [`Notifier`] holds the per-subsystem listener lists and delivers one
//! [`Phase`] to every listener of every present group member, in group
//! order, awaiting each delivery before the next:
//!
//! ```text
//! dispatch(BeforeShutdown, [external_modem, modem])
//!     ├─► external_modem: listener₁ … listenerₙ   (awaited, in order)
//!     └─► modem:          listener₁ … listenerₙ
//! ```
//!
//! ## Rules
//! - Delivery is synchronous relative to the restart sequence; the worker
//!   does not proceed until every listener returned.
//! - Listener errors are collected and returned to the caller; they are
//!   never treated as orchestration failures.
//! - Listeners may be registered for names that have not registered yet;
//!   they start receiving phases once the subsystem exists and crashes.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::notify::listener::{Listener, NotifyError, Phase};
use crate::subsystems::SubsystemHandle;

/// One failed listener delivery.
#[derive(Debug, Clone)]
pub struct NotifyFailure {
    /// Name of the failing listener.
    pub listener: &'static str,
    /// Subsystem the phase was delivered for.
    pub subsystem: Arc<str>,
    /// The phase being delivered.
    pub phase: Phase,
    /// The listener's error.
    pub error: NotifyError,
}

/// Per-subsystem listener registry and dispatch engine.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: RwLock<HashMap<String, Vec<Arc<dyn Listener>>>>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a listener against a subsystem name.
    pub(crate) fn subscribe(&self, subsystem: &str, listener: Arc<dyn Listener>) {
        self.listeners
            .write()
            .expect("listener map poisoned")
            .entry(subsystem.to_string())
            .or_default()
            .push(listener);
    }

    /// Delivers `phase` to every listener of every member, in group order.
    ///
    /// Returns the collected failures; the caller decides how to surface
    /// them (the restart worker publishes `ListenerFailed` events).
    pub(crate) async fn dispatch(
        &self,
        phase: Phase,
        members: &[Arc<SubsystemHandle>],
    ) -> Vec<NotifyFailure> {
        let mut failures = Vec::new();
        for member in members {
            // Snapshot under the read lock; never await while holding it.
            let targets: Vec<Arc<dyn Listener>> = self
                .listeners
                .read()
                .expect("listener map poisoned")
                .get(member.name())
                .cloned()
                .unwrap_or_default();

            for listener in targets {
                if let Err(error) = listener.on_phase(phase, member.name()).await {
                    failures.push(NotifyFailure {
                        listener: listener.name(),
                        subsystem: member.name_arc(),
                        phase,
                        error,
                    });
                }
            }
        }
        failures
    }
}
