//! End-to-end tests of the restart protocol: group ordering, skip and fatal
//! paths, policy levels, and registry edge cases.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Barrier};
use tokio::time::{sleep, timeout};

use subvisor::{
    Coordinator, CoordinatorBuilder, CoordinatorConfig, Event, EventKind, FatalError, FatalHook,
    Listener, NotifyError, Phase, PlatformConfig, RequestError, RestartLevel, RestartPolicy,
    Subscribe, Subsystem, SubsystemError, SubsystemState,
};

/// Shared, ordered record of every callback and phase delivery.
#[derive(Default)]
struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Fake {
    name: &'static str,
    log: Arc<CallLog>,
    fail_shutdown: bool,
    fail_powerup: bool,
    ramdump: bool,
    shutdown_delay: Duration,
    powerup_delay: Duration,
    barrier: Option<Arc<Barrier>>,
}

impl Fake {
    fn new(name: &'static str, log: &Arc<CallLog>) -> Self {
        Self {
            name,
            log: Arc::clone(log),
            fail_shutdown: false,
            fail_powerup: false,
            ramdump: false,
            shutdown_delay: Duration::ZERO,
            powerup_delay: Duration::ZERO,
            barrier: None,
        }
    }

    fn with_ramdump(mut self) -> Self {
        self.ramdump = true;
        self
    }

    fn failing_shutdown(mut self) -> Self {
        self.fail_shutdown = true;
        self
    }

    fn failing_powerup(mut self) -> Self {
        self.fail_powerup = true;
        self
    }

    fn slow_shutdown(mut self, delay: Duration) -> Self {
        self.shutdown_delay = delay;
        self
    }

    fn slow_powerup(mut self, delay: Duration) -> Self {
        self.powerup_delay = delay;
        self
    }

    fn with_barrier(mut self, barrier: &Arc<Barrier>) -> Self {
        self.barrier = Some(Arc::clone(barrier));
        self
    }
}

#[async_trait]
impl Subsystem for Fake {
    fn name(&self) -> &str {
        self.name
    }

    async fn shutdown(&self) -> Result<(), SubsystemError> {
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if !self.shutdown_delay.is_zero() {
            sleep(self.shutdown_delay).await;
        }
        self.log.push(format!("shutdown {}", self.name));
        if self.fail_shutdown {
            return Err(SubsystemError::failed("firmware halt timed out"));
        }
        Ok(())
    }

    async fn powerup(&self) -> Result<(), SubsystemError> {
        if !self.powerup_delay.is_zero() {
            sleep(self.powerup_delay).await;
        }
        self.log.push(format!("powerup {}", self.name));
        if self.fail_powerup {
            return Err(SubsystemError::failed("boot image rejected"));
        }
        Ok(())
    }

    async fn ramdump(&self, enable: bool) -> Result<(), SubsystemError> {
        if !self.ramdump {
            return Err(SubsystemError::Unsupported);
        }
        self.log.push(format!("ramdump {} enable={}", self.name, enable));
        Ok(())
    }

    fn crash_shutdown(&self) {
        self.log.push(format!("crash_shutdown {}", self.name));
    }
}

struct PhaseListener {
    log: Arc<CallLog>,
}

#[async_trait]
impl Listener for PhaseListener {
    async fn on_phase(&self, phase: Phase, subsystem: &str) -> Result<(), NotifyError> {
        self.log.push(format!("phase {phase} {subsystem}"));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "phase_listener"
    }
}

struct FlakyListener;

#[async_trait]
impl Listener for FlakyListener {
    async fn on_phase(&self, _phase: Phase, _subsystem: &str) -> Result<(), NotifyError> {
        Err(NotifyError::new("client quiesce failed"))
    }

    fn name(&self) -> &'static str {
        "flaky_listener"
    }
}

struct EventSink {
    log: Arc<CallLog>,
}

#[async_trait]
impl Subscribe for EventSink {
    async fn on_event(&self, event: &Event) {
        self.log.push(format!("event {:?}", event.kind));
    }

    fn name(&self) -> &'static str {
        "event_sink"
    }
}

struct CaptureHook {
    log: Arc<CallLog>,
}

impl FatalHook for CaptureHook {
    fn on_fatal(&self, fatal: &FatalError) {
        self.log.push(format!("fatal {}", fatal.as_label()));
    }
}

fn coupled() -> RestartPolicy {
    RestartPolicy {
        level: RestartLevel::Coupled,
        ..RestartPolicy::default()
    }
}

async fn wait_for(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(ev) if ev.kind == kind => return ev,
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {kind:?}"))
}

async fn wait_for_online(rx: &mut broadcast::Receiver<Event>, name: &str) {
    timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(ev)
                    if ev.kind == EventKind::StateChanged
                        && ev.subsystem.as_deref() == Some(name)
                        && ev.state == Some(SubsystemState::Online) =>
                {
                    return
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {name} to come online"));
}

async fn wait_idle(coordinator: &Arc<Coordinator>) {
    timeout(Duration::from_secs(5), async {
        while coordinator.restarts_in_flight() != 0 {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("coordinator did not go idle");
}

#[tokio::test]
async fn test_group_restart_runs_full_protocol_in_order() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(
            PlatformConfig::new("test").with_order("modems", &["external_modem", "modem"]),
        )
        .with_policy(coupled())
        .build()
        .unwrap();

    let listener = Arc::new(PhaseListener {
        log: Arc::clone(&log),
    });
    coordinator.subscribe("external_modem", listener.clone());
    coordinator.subscribe("modem", listener);

    let emodem = coordinator
        .register(Arc::new(Fake::new("external_modem", &log).with_ramdump()))
        .await
        .unwrap();
    let modem = coordinator
        .register(Arc::new(Fake::new("modem", &log).with_ramdump()))
        .await
        .unwrap();
    coordinator.set_ramdump_enabled(true);

    let mut rx = coordinator.events();
    // Crash the *second* member: the walk must still start from the first.
    coordinator.request_restart(&modem).unwrap();

    let done = wait_for(&mut rx, EventKind::SequenceCompleted).await;
    assert_eq!(done.subsystem.as_deref(), Some("modem"));
    assert_eq!(done.group.as_deref(), Some("modems"));
    wait_idle(&coordinator).await;

    assert_eq!(
        log.entries(),
        vec![
            "phase before_shutdown external_modem",
            "phase before_shutdown modem",
            "shutdown external_modem",
            "shutdown modem",
            "phase after_shutdown external_modem",
            "phase after_shutdown modem",
            "ramdump external_modem enable=true",
            "ramdump modem enable=true",
            "phase before_powerup external_modem",
            "phase before_powerup modem",
            "powerup external_modem",
            "powerup modem",
            "phase after_powerup external_modem",
            "phase after_powerup modem",
        ]
    );
    assert_eq!(emodem.state(), SubsystemState::Online);
    assert_eq!(modem.state(), SubsystemState::Online);
    assert!(!modem.is_restarting());
}

#[tokio::test]
async fn test_shutdown_failure_escalates_to_fatal() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("test").with_order("pair", &["a", "b"]))
        .with_policy(coupled())
        .with_fatal_hook(Arc::new(CaptureHook {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    let a = coordinator
        .register(Arc::new(Fake::new("a", &log)))
        .await
        .unwrap();
    coordinator
        .register(Arc::new(Fake::new("b", &log).failing_shutdown()))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&a).unwrap();

    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal
        .reason
        .as_deref()
        .unwrap()
        .contains("fatal_shutdown_failed"));
    assert_eq!(fatal.subsystem.as_deref(), Some("b"));
    wait_idle(&coordinator).await;

    let entries = log.entries();
    assert!(!entries.iter().any(|e| e.starts_with("powerup")));
    assert!(entries.contains(&"crash_shutdown a".to_string()));
    assert!(entries.contains(&"crash_shutdown b".to_string()));
    assert!(entries.contains(&"fatal fatal_shutdown_failed".to_string()));
    assert!(coordinator.has_fatal());
}

#[tokio::test]
async fn test_powerup_failure_escalates_to_fatal() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(coupled())
        .with_fatal_hook(Arc::new(CaptureHook {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(Fake::new("dsps", &log).failing_powerup()))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();

    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal
        .reason
        .as_deref()
        .unwrap()
        .contains("fatal_powerup_failed"));
    wait_idle(&coordinator).await;
    assert!(log.entries().contains(&"fatal fatal_powerup_failed".to_string()));
}

#[tokio::test]
async fn test_independent_level_ignores_groups() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(
            PlatformConfig::new("test").with_order("modems", &["external_modem", "modem"]),
        )
        .with_policy(RestartPolicy {
            level: RestartLevel::Independent,
            ..RestartPolicy::default()
        })
        .build()
        .unwrap();

    coordinator
        .register(Arc::new(Fake::new("external_modem", &log)))
        .await
        .unwrap();
    let modem = coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&modem).unwrap();
    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;

    let entries = log.entries();
    assert_eq!(entries, vec!["shutdown modem", "powerup modem"]);
}

#[tokio::test]
async fn test_sibling_crash_during_group_restart_is_skipped() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("test").with_order("pair", &["a", "b"]))
        .with_policy(coupled())
        .build()
        .unwrap();

    let a = coordinator
        .register(Arc::new(
            Fake::new("a", &log).slow_shutdown(Duration::from_millis(200)),
        ))
        .await
        .unwrap();
    let b = coordinator
        .register(Arc::new(Fake::new("b", &log)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&a).unwrap();
    wait_for(&mut rx, EventKind::SequenceStarted).await;

    // The sibling crashes while the walk is mid-shutdown: its worker must
    // yield to the in-flight one, which powers both members back up.
    coordinator.request_restart(&b).unwrap();
    let skipped = wait_for(&mut rx, EventKind::SequenceSkipped).await;
    assert_eq!(skipped.subsystem.as_deref(), Some("b"));

    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;

    assert_eq!(a.state(), SubsystemState::Online);
    assert_eq!(b.state(), SubsystemState::Online);
    assert!(!b.is_restarting());
    assert!(!coordinator.has_fatal());
}

#[tokio::test]
async fn test_disjoint_groups_restart_concurrently() {
    let log = Arc::new(CallLog::default());
    // Both shutdowns rendezvous on the barrier; the test only finishes if the
    // two sequences overlap in time.
    let barrier = Arc::new(Barrier::new(2));
    let coordinator = CoordinatorBuilder::new()
        .with_platform(
            PlatformConfig::new("test")
                .with_order("g1", &["a"])
                .with_order("g2", &["b"]),
        )
        .with_policy(coupled())
        .build()
        .unwrap();

    let a = coordinator
        .register(Arc::new(Fake::new("a", &log).with_barrier(&barrier)))
        .await
        .unwrap();
    let b = coordinator
        .register(Arc::new(Fake::new("b", &log).with_barrier(&barrier)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&a).unwrap();
    coordinator.request_restart(&b).unwrap();

    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;

    assert_eq!(a.state(), SubsystemState::Online);
    assert_eq!(b.state(), SubsystemState::Online);
}

#[tokio::test]
async fn test_overlapping_crash_report_is_fatal() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(coupled())
        .with_fatal_hook(Arc::new(CaptureHook {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(
            Fake::new("modem", &log).slow_shutdown(Duration::from_millis(200)),
        ))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();
    // Second report lands while the first claim is still in flight.
    assert!(coordinator.request_restart(&h).is_ok());

    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal
        .reason
        .as_deref()
        .unwrap()
        .contains("fatal_crashed_during_restart"));
    wait_idle(&coordinator).await;
}

#[tokio::test]
async fn test_crash_loop_threshold_escalates() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(RestartPolicy {
            level: RestartLevel::Coupled,
            max_restarts: 2,
            window: Duration::from_secs(60),
        })
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();
    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;

    coordinator.request_restart(&h).unwrap();
    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal.reason.as_deref().unwrap().contains("fatal_crash_loop"));
    wait_idle(&coordinator).await;
}

#[tokio::test]
async fn test_full_reset_level_escalates_immediately() {
    let log = Arc::new(CallLog::default());
    // Default policy: every crash is a platform reset.
    let coordinator = CoordinatorBuilder::new()
        .with_fatal_hook(Arc::new(CaptureHook {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();

    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal
        .reason
        .as_deref()
        .unwrap()
        .contains("fatal_level_forced_reset"));
    let entries = log.entries();
    assert!(entries.contains(&"crash_shutdown modem".to_string()));
    assert!(!entries.iter().any(|e| e.starts_with("shutdown ")));
    assert_eq!(coordinator.restarts_in_flight(), 0);
}

#[tokio::test]
async fn test_unregister_is_refused_mid_restart() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(coupled())
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(
            Fake::new("modem", &log).slow_shutdown(Duration::from_millis(200)),
        ))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();
    wait_for(&mut rx, EventKind::SequenceStarted).await;

    assert!(matches!(
        coordinator.unregister(&h).await,
        Err(RequestError::Busy { .. })
    ));

    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;

    coordinator.unregister(&h).await.unwrap();
    assert!(coordinator.snapshot().is_empty());
    assert!(matches!(
        coordinator.request_restart_by_name("modem"),
        Err(RequestError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_listener_failure_never_gates_recovery() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(coupled())
        .with_listener("modem", Arc::new(FlakyListener))
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&h).unwrap();

    let failed = wait_for(&mut rx, EventKind::ListenerFailed).await;
    assert!(failed.reason.as_deref().unwrap().contains("flaky_listener"));
    wait_for(&mut rx, EventKind::SequenceCompleted).await;
    wait_idle(&coordinator).await;
    assert_eq!(h.state(), SubsystemState::Online);
}

#[tokio::test]
async fn test_registration_edge_cases() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_config(CoordinatorConfig {
            max_subsystems: 1,
            ..CoordinatorConfig::default()
        })
        .build()
        .unwrap();

    assert!(matches!(
        coordinator.register(Arc::new(Fake::new("", &log))).await,
        Err(RequestError::InvalidName { .. })
    ));

    coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();
    assert!(matches!(
        coordinator
            .register(Arc::new(Fake::new("modem", &log)))
            .await,
        Err(RequestError::AlreadyRegistered { .. })
    ));
    assert!(matches!(
        coordinator
            .register(Arc::new(Fake::new("lpass", &log)))
            .await,
        Err(RequestError::Exhausted { limit: 1 })
    ));
}

#[tokio::test]
async fn test_unlisted_subsystem_warns_and_restarts_alone() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("test").with_order("modems", &["modem"]))
        .with_policy(coupled())
        .build()
        .unwrap();

    let mut rx = coordinator.events();
    let h = coordinator
        .register(Arc::new(Fake::new("dsps", &log)))
        .await
        .unwrap();
    let warned = wait_for(&mut rx, EventKind::GroupUnresolved).await;
    assert_eq!(warned.subsystem.as_deref(), Some("dsps"));

    coordinator.request_restart(&h).unwrap();
    let done = wait_for(&mut rx, EventKind::SequenceCompleted).await;
    assert_eq!(done.group, None);
    wait_idle(&coordinator).await;
    assert_eq!(log.entries(), vec!["shutdown dsps", "powerup dsps"]);
}

#[tokio::test]
async fn test_policy_level_is_clamped_by_platform() {
    let coordinator = CoordinatorBuilder::new()
        .with_platform(
            PlatformConfig::new("sglte")
                .allow_only(&[RestartLevel::Coupled])
                .with_downgrade(RestartLevel::Independent, RestartLevel::Coupled),
        )
        .with_policy(coupled())
        .build()
        .unwrap();

    let effective = coordinator
        .set_policy(RestartPolicy {
            level: RestartLevel::Independent,
            ..RestartPolicy::default()
        })
        .unwrap();
    assert_eq!(effective.level, RestartLevel::Coupled);
    assert_eq!(coordinator.policy().level, RestartLevel::Coupled);

    let locked_down = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("msm9615").allow_only(&[RestartLevel::FullReset]))
        .build()
        .unwrap();
    assert!(matches!(
        locked_down.set_policy(coupled()),
        Err(RequestError::InvalidLevel { .. })
    ));
}

#[tokio::test]
async fn test_retained_handle_is_dead_after_unregister() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_policy(coupled())
        .build()
        .unwrap();

    let h = coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();
    coordinator.unregister(&h).await.unwrap();

    // The caller still holds the Arc; it must not be restartable.
    assert_eq!(h.state(), SubsystemState::Offline);
    assert!(matches!(
        coordinator.request_restart(&h),
        Err(RequestError::NotFound { .. })
    ));
    assert!(log.entries().is_empty());
    assert_eq!(coordinator.restarts_in_flight(), 0);
}

#[tokio::test]
async fn test_crash_during_group_powerup_is_fatal() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("test").with_order("pair", &["a", "b"]))
        .with_policy(coupled())
        .with_fatal_hook(Arc::new(CaptureHook {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    let a = coordinator
        .register(Arc::new(Fake::new("a", &log)))
        .await
        .unwrap();
    let b = coordinator
        .register(Arc::new(
            Fake::new("b", &log).slow_powerup(Duration::from_millis(300)),
        ))
        .await
        .unwrap();

    let mut rx = coordinator.events();
    coordinator.request_restart(&b).unwrap();

    // "a" is already powered back up while "b" still holds the walk in its
    // powerup phase; a crash on "a" now means a member died during powerup.
    wait_for_online(&mut rx, "a").await;
    coordinator.request_restart(&a).unwrap();

    let fatal = wait_for(&mut rx, EventKind::PlatformFatal).await;
    assert!(fatal
        .reason
        .as_deref()
        .unwrap()
        .contains("fatal_died_during_powerup"));
    assert_eq!(fatal.subsystem.as_deref(), Some("a"));
    wait_idle(&coordinator).await;
    assert!(log
        .entries()
        .contains(&"fatal fatal_died_during_powerup".to_string()));
}

#[tokio::test]
async fn test_build_time_level_downgrade_is_published() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(
            PlatformConfig::new("sglte")
                .allow_only(&[RestartLevel::Coupled])
                .with_downgrade(RestartLevel::Independent, RestartLevel::Coupled),
        )
        .with_policy(RestartPolicy {
            level: RestartLevel::Independent,
            ..RestartPolicy::default()
        })
        .with_subscriber(Arc::new(EventSink {
            log: Arc::clone(&log),
        }))
        .build()
        .unwrap();

    assert_eq!(coordinator.policy().level, RestartLevel::Coupled);
    timeout(Duration::from_secs(5), async {
        while !log
            .entries()
            .contains(&"event LevelDowngraded".to_string())
        {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("downgrade event was not delivered");
}

#[tokio::test]
async fn test_snapshot_reflects_registry() {
    let log = Arc::new(CallLog::default());
    let coordinator = CoordinatorBuilder::new()
        .with_platform(PlatformConfig::new("test").with_order("modems", &["modem"]))
        .with_policy(coupled())
        .build()
        .unwrap();

    coordinator
        .register(Arc::new(Fake::new("modem", &log)))
        .await
        .unwrap();
    coordinator
        .register(Arc::new(Fake::new("dsps", &log)))
        .await
        .unwrap();

    let snapshot = coordinator.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].name, "dsps");
    assert_eq!(snapshot[0].group, None);
    assert_eq!(snapshot[1].name, "modem");
    assert_eq!(snapshot[1].group.as_deref(), Some("modems"));
    assert!(snapshot.iter().all(|s| s.state == SubsystemState::Online));
    assert!(snapshot.iter().all(|s| !s.restarting));
}
