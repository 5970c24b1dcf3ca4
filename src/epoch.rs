//! # Crash-loop detection over a sliding time window.
//!
//! [`CrashLog`] keeps one global, time-windowed log of restart events. It is
//! deliberately global across all subsystems: the intent is to catch systemic
//! instability, not just one repeatedly crashing component.
//!
//! ## Algorithm
//! On every check (once per restart, after the group's shutdown lock is
//! acquired and before any shutdown callback runs):
//!
//! 1. Append a timestamped entry for the triggering subsystem.
//! 2. Prune all entries older than `window` relative to the new entry.
//! 3. If the surviving count reaches `max_restarts` **and** the oldest
//!    survivor is within `window` of the newest, the platform has
//!    crash-looped → [`FatalError::CrashLoop`].
//!
//! `max_restarts == 0` disables the detector entirely.
//!
//! ## Rules
//! - The log is guarded by its own mutex, held only for the duration of the
//!   append+prune+check; it is never held across an await point.
//! - Entries are always sorted by arrival time, so pruning walks oldest-first.
//! - The log is in-memory only and resets with the coordinator process.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::FatalError;

/// One recorded restart event.
#[derive(Debug)]
struct LogEntry {
    at: Instant,
    subsystem: Arc<str>,
}

/// Global sliding-window log of restart events.
#[derive(Debug, Default)]
pub(crate) struct CrashLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl CrashLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a restart of `subsystem` and evaluates the crash-loop
    /// threshold against the current tunables.
    pub(crate) fn check(
        &self,
        subsystem: Arc<str>,
        max_restarts: u32,
        window: Duration,
    ) -> Result<(), FatalError> {
        self.check_at(subsystem, Instant::now(), max_restarts, window)
    }

    /// Injectable form of [`CrashLog::check`] used by tests.
    fn check_at(
        &self,
        subsystem: Arc<str>,
        now: Instant,
        max_restarts: u32,
        window: Duration,
    ) -> Result<(), FatalError> {
        if max_restarts == 0 {
            return Ok(());
        }

        let mut entries = self.entries.lock().expect("crash log poisoned");
        entries.push(LogEntry { at: now, subsystem });
        entries.retain(|e| now.duration_since(e.at) <= window);

        let count = entries.len();
        let oldest = entries.first().map(|e| e.at).unwrap_or(now);
        if count >= max_restarts as usize && now.duration_since(oldest) < window {
            return Err(FatalError::CrashLoop { count, window });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    fn name(n: &str) -> Arc<str> {
        Arc::from(n)
    }

    #[test]
    fn test_burst_of_distinct_subsystems_escalates() {
        let log = CrashLog::new();
        let t0 = Instant::now();

        assert!(log.check_at(name("modem"), t0, 3, WINDOW).is_ok());
        assert!(log
            .check_at(name("lpass"), t0 + Duration::from_secs(5), 3, WINDOW)
            .is_ok());
        let third = log.check_at(name("dsps"), t0 + Duration::from_secs(10), 3, WINDOW);
        assert!(matches!(third, Err(FatalError::CrashLoop { count: 3, .. })));
    }

    #[test]
    fn test_spaced_restarts_do_not_escalate() {
        let log = CrashLog::new();
        let t0 = Instant::now();

        for i in 0..3u64 {
            let at = t0 + Duration::from_secs(30 * i);
            assert!(
                log.check_at(name("modem"), at, 3, WINDOW).is_ok(),
                "restart {i} spaced 30s apart must pass"
            );
        }
    }

    #[test]
    fn test_old_entries_are_pruned() {
        let log = CrashLog::new();
        let t0 = Instant::now();

        log.check_at(name("modem"), t0, 3, WINDOW).unwrap();
        log.check_at(name("modem"), t0 + Duration::from_secs(1), 3, WINDOW)
            .unwrap();
        // Both earlier entries fall out of the window before the third check.
        let late = log.check_at(name("modem"), t0 + Duration::from_secs(120), 3, WINDOW);
        assert!(late.is_ok());
    }

    #[test]
    fn test_zero_threshold_disables_detector() {
        let log = CrashLog::new();
        let t0 = Instant::now();
        for i in 0..10u64 {
            let at = t0 + Duration::from_millis(i);
            assert!(log.check_at(name("modem"), at, 0, WINDOW).is_ok());
        }
    }
}
