//! # Runtime events emitted by the coordinator and restart workers.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Registry events**: subsystems appearing and disappearing
//! - **Restart events**: the shutdown→dump→powerup sequence phases
//! - **Policy events**: restart level changes
//! - **Plumbing events**: subscriber overflow/panic reports
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! subsystem/group names, states, and notification phases.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::notify::Phase;
use crate::subsystems::SubsystemState;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber plumbing ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets: `subsystem` (subscriber name), `reason` (panic info).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `subsystem` (subscriber name), `reason` ("full" or "closed").
    SubscriberOverflow,

    // === Registry events ===
    /// A subsystem was registered and is now online.
    ///
    /// Sets: `subsystem`, `group` (when a restart group was resolved).
    Registered,

    /// A subsystem was unregistered and its handle released.
    ///
    /// Sets: `subsystem`.
    Unregistered,

    /// No platform table matched the subsystem name; it will restart as its
    /// own singleton group. Usually indicates a misconfiguration.
    ///
    /// Sets: `subsystem`.
    GroupUnresolved,

    // === Restart sequence events ===
    /// A crash was reported and the restart was claimed.
    ///
    /// Sets: `subsystem`, `reason` (active restart level).
    RestartRequested,

    /// A restart worker acquired the group locks and is starting the
    /// shutdown→dump→powerup sequence.
    ///
    /// Sets: `subsystem` (the triggering member), `group`.
    SequenceStarted,

    /// A restart worker found the group's shutdown phase already owned by
    /// another in-flight restart and returned without doing work.
    ///
    /// Sets: `subsystem`, `group`.
    SequenceSkipped,

    /// A subsystem transitioned between lifecycle states.
    ///
    /// Sets: `subsystem`, `state`.
    StateChanged,

    /// A lifecycle listener returned an error during notification delivery.
    /// Observational only; never aborts the sequence.
    ///
    /// Sets: `subsystem`, `phase`, `reason` (listener name and error).
    ListenerFailed,

    /// A ramdump callback failed. Best-effort; recovery continues.
    ///
    /// Sets: `subsystem`, `reason`.
    RamdumpFailed,

    /// The full restart sequence completed and every member is online again.
    ///
    /// Sets: `subsystem` (the triggering member), `group`.
    SequenceCompleted,

    // === Policy events ===
    /// The restart level or crash-loop tunables changed.
    ///
    /// Sets: `reason` (new level).
    LevelChanged,

    /// A requested level is unsupported on this platform and was replaced by
    /// the configured fallback.
    ///
    /// Sets: `reason` (requested and effective levels).
    LevelDowngraded,

    // === Fatal ===
    /// A platform-fatal condition was raised; the embedding application is
    /// expected to reset the platform.
    ///
    /// Sets: `subsystem` (when attributable), `reason` (fatal label/message).
    PlatformFatal,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the subsystem, if applicable.
    pub subsystem: Option<Arc<str>>,
    /// Name of the restart group, if applicable.
    pub group: Option<Arc<str>>,
    /// New lifecycle state (for `StateChanged`).
    pub state: Option<SubsystemState>,
    /// Notification phase (for `ListenerFailed`).
    pub phase: Option<Phase>,
    /// Human-readable reason (errors, level names, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            subsystem: None,
            group: None,
            state: None,
            phase: None,
            reason: None,
        }
    }

    /// Attaches a subsystem name.
    #[inline]
    pub fn with_subsystem(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subsystem = Some(name.into());
        self
    }

    /// Attaches a restart group name.
    #[inline]
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Attaches a lifecycle state.
    #[inline]
    pub fn with_state(mut self, state: SubsystemState) -> Self {
        self.state = Some(state);
        self
    }

    /// Attaches a notification phase.
    #[inline]
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subsystem(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subsystem(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Registered);
        let b = Event::new(EventKind::Registered);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let ev = Event::new(EventKind::StateChanged)
            .with_subsystem("modem")
            .with_state(SubsystemState::Offline)
            .with_reason("shutdown complete");
        assert_eq!(ev.subsystem.as_deref(), Some("modem"));
        assert_eq!(ev.state, Some(SubsystemState::Offline));
        assert_eq!(ev.reason.as_deref(), Some("shutdown complete"));
    }
}
