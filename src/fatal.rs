//! # The platform-fatal channel.
//!
//! Exactly one component of the coordinator is responsible for escalating to
//! a full platform reset: the [`FatalChannel`]. Every fatal condition —
//! overlapping crash on one handle, powerup lock unavailable after a fresh
//! shutdown claim, shutdown/powerup callback failure, crash-loop threshold,
//! full-reset policy — funnels through [`FatalChannel::raise`].
//!
//! Raising a fatal:
//! 1. invokes `crash_shutdown()` synchronously on every registered subsystem
//!    (best effort, no failure handling is possible at that point),
//! 2. publishes a [`EventKind::PlatformFatal`] event,
//! 3. calls the embedding application's [`FatalHook`] — at most once; later
//!    fatals only publish their event.
//!
//! The core never exits the process itself. What "reset the platform" means
//! (process exit, supervisor-triggered hardware reset, test-harness capture)
//! is entirely the hook's business.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::FatalError;
use crate::events::{Bus, Event, EventKind};
use crate::subsystems::SubsystemHandle;

/// Embedding-application handler for platform-fatal conditions.
pub trait FatalHook: Send + Sync + 'static {
    /// Called at most once, with the first fatal condition raised.
    fn on_fatal(&self, fatal: &FatalError);
}

/// Default hook: the fatal is only observable through the event bus.
struct NullHook;

impl FatalHook for NullHook {
    fn on_fatal(&self, _fatal: &FatalError) {}
}

/// Single escalation point for every fatal condition.
pub(crate) struct FatalChannel {
    hook: Arc<dyn FatalHook>,
    bus: Bus,
    fired: AtomicBool,
}

impl FatalChannel {
    pub(crate) fn new(hook: Option<Arc<dyn FatalHook>>, bus: Bus) -> Self {
        Self {
            hook: hook.unwrap_or_else(|| Arc::new(NullHook)),
            bus,
            fired: AtomicBool::new(false),
        }
    }

    /// Escalates a fatal condition.
    ///
    /// `registered` is a snapshot of every live handle; each one gets its
    /// `crash_shutdown` invoked before the hook fires. The first caller wins;
    /// concurrent or later fatals only publish their event.
    pub(crate) fn raise(&self, fatal: FatalError, registered: &[Arc<SubsystemHandle>]) {
        let mut ev = Event::new(EventKind::PlatformFatal)
            .with_reason(format!("{}: {}", fatal.as_label(), fatal.as_message()));
        if let Some(name) = fatal.subsystem() {
            ev = ev.with_subsystem(name.to_string());
        }

        if self.fired.swap(true, Ordering::SeqCst) {
            self.bus.publish(ev);
            return;
        }

        for handle in registered {
            handle.subsystem().crash_shutdown();
        }
        self.bus.publish(ev);
        self.hook.on_fatal(&fatal);
    }

    /// Returns true once a fatal has been raised.
    pub(crate) fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}
