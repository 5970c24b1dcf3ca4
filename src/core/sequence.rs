//! # The restart worker: one spawned task per claimed crash.
//!
//! Drives the shutdown → ramdump → powerup protocol for the crashed
//! subsystem's restart scope (its group at level `Coupled`, itself alone
//! otherwise):
//!
//! ```text
//! try shutdown lock ──fail──► SequenceSkipped (a sibling's worker owns it)
//!         │
//! try powerup lock ───fail──► fatal: died during powerup
//!         │
//! crash-loop check ───trip──► fatal: crash loop
//!         │
//! [registry iteration guard, shared, held to the end]
//!   before_shutdown → shutdown each member → after_shutdown
//!   [shutdown lock released]
//!   ramdump each member (best effort)
//!   before_powerup → powerup each member → after_powerup
//! SequenceCompleted
//! ```
//!
//! ## Rules
//! - Both locks are try-acquired only; this worker never waits for another
//!   restart. The skip path is a real outcome, not an error: the lock owner
//!   will power this member back up as part of its own walk.
//! - The member list is captured once and reused for every step; the
//!   registry iteration guard is held shared for the whole walk, so
//!   registration changes wait for it while workers of disjoint scopes run
//!   concurrently.
//! - Every exit path, skip and fatal included, clears the handle's
//!   `restarting` flag and releases the in-flight hold.
//! - A shutdown or powerup callback failure is platform-fatal; a ramdump
//!   failure is reported and ignored.

use std::sync::Arc;

use crate::core::coordinator::{Coordinator, RestartHold};
use crate::error::{FatalError, SubsystemError};
use crate::events::{Event, EventKind};
use crate::groups::{RestartGroup, RestartLocks};
use crate::notify::Phase;
use crate::subsystems::{SubsystemHandle, SubsystemState};

/// How one worker run ended.
enum Outcome {
    /// Another in-flight restart owns the scope; nothing was touched.
    Skipped,
    /// Every member is back online.
    Completed,
    /// The protocol broke; escalate.
    Fatal(FatalError),
}

/// Entry point of the restart worker task.
///
/// `honor_groups` is decided at claim time from the policy level; a policy
/// change while this worker runs does not affect it.
pub(super) async fn run(
    coord: Arc<Coordinator>,
    handle: Arc<SubsystemHandle>,
    honor_groups: bool,
    hold: RestartHold,
) {
    let group = if honor_groups {
        handle.group().cloned()
    } else {
        None
    };
    let locks = match &group {
        Some(g) => g.locks(),
        None => handle.own_locks(),
    };

    let outcome = drive(&coord, &handle, group.as_deref(), locks).await;
    if let Outcome::Fatal(fatal) = outcome {
        coord.fatal.raise(fatal, &coord.registered_handles());
    }

    // Single place the claim is released, regardless of outcome.
    handle.finish_restart();
    drop(hold);
}

async fn drive(
    coord: &Coordinator,
    handle: &Arc<SubsystemHandle>,
    group: Option<&RestartGroup>,
    locks: &RestartLocks,
) -> Outcome {
    let trigger = handle.name_arc();
    let group_name: Option<Arc<str>> = group.map(|g| Arc::from(g.name()));

    let Some(shutdown_guard) = locks.try_shutdown() else {
        coord.bus.publish(scoped(
            EventKind::SequenceSkipped,
            &trigger,
            group_name.as_ref(),
        ));
        return Outcome::Skipped;
    };
    // A fresh claim with the powerup phase still owned means a member died
    // while being brought back up.
    let Some(_powerup_guard) = locks.try_powerup() else {
        return Outcome::Fatal(FatalError::DiedDuringPowerup {
            subsystem: trigger.to_string(),
        });
    };

    let policy = coord.policy();
    if let Err(fatal) = coord
        .crash_log
        .check(trigger.clone(), policy.max_restarts, policy.window)
    {
        return Outcome::Fatal(fatal);
    }

    // Shared iteration guard: registration changes are excluded for the rest
    // of the walk, workers of other scopes are not.
    let _order = coord.order_guard.read().await;

    let members: Vec<Arc<SubsystemHandle>> = match group {
        Some(g) => g.members(),
        None => vec![Arc::clone(handle)],
    };
    coord.bus.publish(scoped(
        EventKind::SequenceStarted,
        &trigger,
        group_name.as_ref(),
    ));

    notify_phase(coord, Phase::BeforeShutdown, &members).await;
    for member in &members {
        if let Err(error) = member.subsystem().shutdown().await {
            return Outcome::Fatal(FatalError::ShutdownFailed {
                subsystem: member.name().to_string(),
                error,
            });
        }
        publish_state(coord, member, SubsystemState::Offline);
    }
    notify_phase(coord, Phase::AfterShutdown, &members).await;

    // Everything is down; new crashes in this scope may queue skip-workers
    // from here on.
    drop(shutdown_guard);

    let enable = coord.ramdump_enabled();
    for member in &members {
        match member.subsystem().ramdump(enable).await {
            Ok(()) | Err(SubsystemError::Unsupported) => {}
            Err(error) => {
                coord.bus.publish(
                    Event::new(EventKind::RamdumpFailed)
                        .with_subsystem(member.name_arc())
                        .with_reason(error.to_string()),
                );
            }
        }
    }

    notify_phase(coord, Phase::BeforePowerup, &members).await;
    for member in &members {
        if let Err(error) = member.subsystem().powerup().await {
            return Outcome::Fatal(FatalError::PowerupFailed {
                subsystem: member.name().to_string(),
                error,
            });
        }
        publish_state(coord, member, SubsystemState::Online);
    }
    notify_phase(coord, Phase::AfterPowerup, &members).await;

    coord.bus.publish(scoped(
        EventKind::SequenceCompleted,
        &trigger,
        group_name.as_ref(),
    ));
    Outcome::Completed
}

/// Delivers one phase to every member's listeners; failures become
/// `ListenerFailed` events and never gate the sequence.
async fn notify_phase(coord: &Coordinator, phase: Phase, members: &[Arc<SubsystemHandle>]) {
    for failure in coord.notifier.dispatch(phase, members).await {
        coord.bus.publish(
            Event::new(EventKind::ListenerFailed)
                .with_subsystem(failure.subsystem.clone())
                .with_phase(failure.phase)
                .with_reason(format!("{}: {}", failure.listener, failure.error)),
        );
    }
}

fn publish_state(coord: &Coordinator, member: &Arc<SubsystemHandle>, state: SubsystemState) {
    if member.set_state(state) {
        coord.bus.publish(
            Event::new(EventKind::StateChanged)
                .with_subsystem(member.name_arc())
                .with_state(state),
        );
    }
}

fn scoped(kind: EventKind, trigger: &Arc<str>, group: Option<&Arc<str>>) -> Event {
    let mut ev = Event::new(kind).with_subsystem(trigger.clone());
    if let Some(g) = group {
        ev = ev.with_group(g.clone());
    }
    ev
}
