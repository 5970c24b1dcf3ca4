//! # The restart coordinator: registry, API surface, and restart scheduling.
//!
//! [`Coordinator`] owns the handle registry, the active [`RestartPolicy`],
//! the compiled platform tables, and the fatal channel. It is the only entry
//! point for crash reports.
//!
//! ```text
//!   register ──► handles map ──► group slot attach (platform tables)
//!
//!   request_restart ──► atomic claim on the handle
//!        │                   ├─ Claimed  → spawn restart worker
//!        │                   ├─ Offline  → Err(NotFound)
//!        │                   └─ Fatal    → fatal channel
//!        └─ level FullReset ──────────────► fatal channel
//! ```
//!
//! ## Rules
//! - A crash report never blocks: the reporting task only runs the atomic
//!   claim and a `tokio::spawn`; the sequence itself happens on a worker.
//! - The registry iteration guard (`order_guard`) excludes registration and
//!   unregistration while any restart worker is walking its members; workers
//!   of disjoint groups share it and run concurrently.
//! - Policy changes apply to subsequent requests only; an in-flight sequence
//!   keeps the level it was claimed under.
//! - After a fatal has been raised, further crash reports are accepted and
//!   ignored; the platform is already resetting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{broadcast, RwLock as AsyncRwLock};

use crate::core::config::CoordinatorConfig;
use crate::core::sequence;
use crate::epoch::CrashLog;
use crate::error::{FatalError, RequestError};
use crate::events::{Bus, Event, EventKind};
use crate::fatal::FatalChannel;
use crate::groups::{GroupTables, PlatformConfig};
use crate::notify::{Listener, Notifier};
use crate::policy::{RestartLevel, RestartPolicy};
use crate::subsystems::{ClaimOutcome, SubsystemHandle, SubsystemRef, SubsystemState};

/// Maximum accepted subsystem name length, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Snapshot of one registered subsystem, as returned by
/// [`Coordinator::snapshot`].
#[derive(Debug, Clone)]
pub struct SubsystemInfo {
    /// Subsystem name.
    pub name: String,
    /// Lifecycle state at snapshot time.
    pub state: SubsystemState,
    /// Whether a claimed restart is in flight.
    pub restarting: bool,
    /// Resolved restart group, if any.
    pub group: Option<Arc<str>>,
}

/// In-flight restart marker.
///
/// Held by the restart worker from the moment the claim succeeds until the
/// sequence returns, on every exit path. The counter it maintains is the
/// "platform must stay awake, recovery pending" signal exposed through
/// [`Coordinator::restarts_in_flight`].
pub(super) struct RestartHold {
    in_flight: Arc<AtomicUsize>,
}

impl RestartHold {
    pub(super) fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            in_flight: Arc::clone(counter),
        }
    }
}

impl Drop for RestartHold {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Restart coordinator for crashed hardware/firmware subsystems.
///
/// Built via [`CoordinatorBuilder`](crate::CoordinatorBuilder); always used
/// behind an `Arc` so restart workers can be spawned from crash reports.
pub struct Coordinator {
    pub(super) cfg: CoordinatorConfig,
    pub(super) platform: PlatformConfig,
    pub(super) bus: Bus,
    pub(super) notifier: Notifier,
    pub(super) tables: GroupTables,
    pub(super) crash_log: CrashLog,
    pub(super) fatal: FatalChannel,

    pub(super) handles: RwLock<HashMap<String, Arc<SubsystemHandle>>>,
    pub(super) policy: RwLock<RestartPolicy>,
    pub(super) ramdumps: AtomicBool,
    pub(super) next_id: AtomicU64,

    /// Registry iteration guard: restart workers hold it shared for the
    /// whole member walk, registration changes take it exclusively.
    pub(super) order_guard: AsyncRwLock<()>,
    pub(super) in_flight: Arc<AtomicUsize>,
}

impl Coordinator {
    /// Assembles a coordinator from pre-wired parts (builder-only).
    pub(super) fn new(
        cfg: CoordinatorConfig,
        platform: PlatformConfig,
        bus: Bus,
        notifier: Notifier,
        fatal: FatalChannel,
    ) -> Result<Arc<Self>, RequestError> {
        let (level, downgraded) = platform.clamp_level(cfg.policy.level)?;
        if downgraded {
            // Same signal set_policy emits for runtime downgrades.
            bus.publish(
                Event::new(EventKind::LevelDowngraded)
                    .with_reason(format!("{} -> {}", cfg.policy.level, level)),
            );
        }
        let policy = RestartPolicy { level, ..cfg.policy };
        let tables = GroupTables::compile(&platform);
        let ramdumps = AtomicBool::new(cfg.enable_ramdumps);

        Ok(Arc::new(Self {
            cfg,
            platform,
            bus,
            notifier,
            tables,
            crash_log: CrashLog::new(),
            fatal,
            handles: RwLock::new(HashMap::new()),
            policy: RwLock::new(policy),
            ramdumps,
            next_id: AtomicU64::new(1),
            order_guard: AsyncRwLock::new(()),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }))
    }

    /// Registers a subsystem and returns its handle, `Online`.
    ///
    /// The name is resolved against the platform tables exactly once, here.
    /// A name no table lists gets no group (it will restart as its own
    /// singleton) and a [`EventKind::GroupUnresolved`] warning is published.
    ///
    /// # Errors
    /// - [`RequestError::InvalidName`] — empty or longer than [`MAX_NAME_LEN`]
    /// - [`RequestError::AlreadyRegistered`] — the name is taken
    /// - [`RequestError::Exhausted`] — the configured registry limit is hit
    pub async fn register(
        &self,
        subsystem: SubsystemRef,
    ) -> Result<Arc<SubsystemHandle>, RequestError> {
        let name = subsystem.name().to_string();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(RequestError::InvalidName { name });
        }
        let group = self.tables.resolve(&name);

        let handle = {
            let _order = self.order_guard.write().await;
            let mut map = self.handles.write().expect("handle map poisoned");
            if map.contains_key(&name) {
                return Err(RequestError::AlreadyRegistered { name });
            }
            if let Some(limit) = self.cfg.capacity_limit() {
                if map.len() >= limit {
                    return Err(RequestError::Exhausted { limit });
                }
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let handle = Arc::new(SubsystemHandle::new(id, subsystem, group.clone()));
            // Slot attach happens before the handle becomes discoverable by
            // name, so sibling restarts never see a half-registered member.
            if let Some(g) = &group {
                g.attach(&handle);
            }
            map.insert(name, handle.clone());
            handle
        };

        let mut ev = Event::new(EventKind::Registered).with_subsystem(handle.name_arc());
        if let Some(g) = &group {
            ev = ev.with_group(g.name());
        }
        self.bus.publish(ev);
        if group.is_none() {
            self.bus
                .publish(Event::new(EventKind::GroupUnresolved).with_subsystem(handle.name_arc()));
        }
        Ok(handle)
    }

    /// Unregisters a subsystem and empties its group slot.
    ///
    /// Refused while its restart scope is busy: an in-flight sequence holds
    /// the scope's powerup lock from claim to completion, so the try-acquire
    /// here doubles as the liveness check. A retained handle is `Offline`
    /// afterwards; crash reports against it return `NotFound`.
    ///
    /// # Errors
    /// - [`RequestError::Busy`] — a restart of the scope is in flight
    /// - [`RequestError::NotFound`] — the handle is not the registered one
    pub async fn unregister(&self, handle: &Arc<SubsystemHandle>) -> Result<(), RequestError> {
        let scope = match handle.group() {
            Some(g) => g.locks(),
            None => handle.own_locks(),
        };
        let Some(_powerup) = scope.try_powerup() else {
            return Err(RequestError::Busy {
                name: handle.name().to_string(),
            });
        };
        if handle.is_restarting() {
            return Err(RequestError::Busy {
                name: handle.name().to_string(),
            });
        }

        {
            let _order = self.order_guard.write().await;
            let mut map = self.handles.write().expect("handle map poisoned");
            match map.get(handle.name()) {
                Some(current) if Arc::ptr_eq(current, handle) => {
                    map.remove(handle.name());
                }
                _ => {
                    return Err(RequestError::NotFound {
                        name: handle.name().to_string(),
                    })
                }
            }
            if let Some(g) = handle.group() {
                g.detach(handle.name());
            }
            // The caller may retain the handle; a torn-down one must report
            // NotFound on any further crash, never be claimable again.
            handle.set_state(SubsystemState::Offline);
        }

        self.bus
            .publish(Event::new(EventKind::Unregistered).with_subsystem(handle.name_arc()));
        Ok(())
    }

    /// Reports a crash and schedules recovery according to the active policy.
    ///
    /// Never blocks: the call performs the atomic claim and spawns the
    /// restart worker. At level `FullReset` no claim happens; the crash goes
    /// straight to the fatal channel. An overlapping crash report (the
    /// subsystem is already `Crashed` or mid-restart) is platform-fatal and
    /// still returns `Ok`, since the caller cannot recover it.
    ///
    /// # Errors
    /// - [`RequestError::NotFound`] — the handle is `Offline` / torn down
    pub fn request_restart(
        self: &Arc<Self>,
        handle: &Arc<SubsystemHandle>,
    ) -> Result<(), RequestError> {
        if self.fatal.has_fired() {
            return Ok(());
        }
        let policy = self.policy();
        if policy.level == RestartLevel::FullReset {
            self.fatal.raise(
                FatalError::LevelForcedReset {
                    subsystem: handle.name().to_string(),
                },
                &self.registered_handles(),
            );
            return Ok(());
        }

        match handle.claim_restart() {
            ClaimOutcome::Offline => Err(RequestError::NotFound {
                name: handle.name().to_string(),
            }),
            ClaimOutcome::Fatal => {
                self.fatal.raise(
                    FatalError::CrashedDuringRestart {
                        subsystem: handle.name().to_string(),
                    },
                    &self.registered_handles(),
                );
                Ok(())
            }
            ClaimOutcome::Claimed => {
                self.bus.publish(
                    Event::new(EventKind::StateChanged)
                        .with_subsystem(handle.name_arc())
                        .with_state(SubsystemState::Crashed),
                );
                self.bus.publish(
                    Event::new(EventKind::RestartRequested)
                        .with_subsystem(handle.name_arc())
                        .with_reason(policy.level.as_str()),
                );

                let hold = RestartHold::new(&self.in_flight);
                let honor_groups = policy.level == RestartLevel::Coupled;
                tokio::spawn(sequence::run(
                    Arc::clone(self),
                    Arc::clone(handle),
                    honor_groups,
                    hold,
                ));
                Ok(())
            }
        }
    }

    /// Reports a crash by subsystem name.
    ///
    /// # Errors
    /// - [`RequestError::NotFound`] — no registered subsystem has this name
    pub fn request_restart_by_name(self: &Arc<Self>, name: &str) -> Result<(), RequestError> {
        let handle = self
            .handles
            .read()
            .expect("handle map poisoned")
            .get(name)
            .cloned()
            .ok_or_else(|| RequestError::NotFound {
                name: name.to_string(),
            })?;
        self.request_restart(&handle)
    }

    /// Registers a lifecycle listener against a subsystem name.
    ///
    /// The name does not have to be registered yet; the listener starts
    /// receiving phases once the subsystem exists and restarts.
    pub fn subscribe(&self, subsystem: &str, listener: Arc<dyn Listener>) {
        self.notifier.subscribe(subsystem, listener);
    }

    /// Replaces the restart policy, validating the level against the
    /// platform. Returns the effective policy, which may carry a downgraded
    /// level.
    ///
    /// # Errors
    /// - [`RequestError::InvalidLevel`] — the platform neither allows the
    ///   level nor maps it to a fallback
    pub fn set_policy(&self, requested: RestartPolicy) -> Result<RestartPolicy, RequestError> {
        let (level, downgraded) = self.platform.clamp_level(requested.level)?;
        let effective = RestartPolicy { level, ..requested };
        *self.policy.write().expect("policy lock poisoned") = effective;

        if downgraded {
            self.bus.publish(
                Event::new(EventKind::LevelDowngraded)
                    .with_reason(format!("{} -> {}", requested.level, level)),
            );
        }
        self.bus
            .publish(Event::new(EventKind::LevelChanged).with_reason(level.as_str()));
        Ok(effective)
    }

    /// Returns the active restart policy.
    pub fn policy(&self) -> RestartPolicy {
        *self.policy.read().expect("policy lock poisoned")
    }

    /// Flips the operator's ramdump switch, effective for the next sequence.
    pub fn set_ramdump_enabled(&self, enabled: bool) {
        self.ramdumps.store(enabled, Ordering::SeqCst);
    }

    /// Returns the current ramdump switch value.
    pub fn ramdump_enabled(&self) -> bool {
        self.ramdumps.load(Ordering::SeqCst)
    }

    /// Opens a new receiver on the event bus.
    ///
    /// Only events published after this call are observed.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Returns a snapshot of every registered subsystem, sorted by name.
    pub fn snapshot(&self) -> Vec<SubsystemInfo> {
        let mut out: Vec<SubsystemInfo> = self
            .handles
            .read()
            .expect("handle map poisoned")
            .values()
            .map(|h| SubsystemInfo {
                name: h.name().to_string(),
                state: h.state(),
                restarting: h.is_restarting(),
                group: h.group().map(|g| Arc::from(g.name())),
            })
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Number of claimed restarts whose sequence has not returned yet.
    pub fn restarts_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Returns true once a platform-fatal condition has been raised.
    pub fn has_fatal(&self) -> bool {
        self.fatal.has_fired()
    }

    /// Snapshot of every live handle, for the fatal path's crash-shutdown
    /// walk.
    pub(crate) fn registered_handles(&self) -> Vec<Arc<SubsystemHandle>> {
        self.handles
            .read()
            .expect("handle map poisoned")
            .values()
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("platform", &self.platform.variant())
            .field("policy", &self.policy())
            .field("subsystems", &self.handles.read().expect("handle map poisoned").len())
            .field("in_flight", &self.restarts_in_flight())
            .finish()
    }
}
