//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [registered] subsystem=modem group=modems
//! [restart-requested] subsystem=modem level=coupled
//! [state] subsystem=modem state=OFFLINE
//! [sequence-completed] subsystem=modem group=modems
//! [platform-fatal] reason=fatal_crash_loop: 3 restarts in less than 60s
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Not intended for production use —
/// implement a custom [`Subscribe`] for structured logging or metrics.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Registered => {
                println!(
                    "[registered] subsystem={:?} group={:?}",
                    e.subsystem, e.group
                );
            }
            EventKind::Unregistered => {
                println!("[unregistered] subsystem={:?}", e.subsystem);
            }
            EventKind::GroupUnresolved => {
                println!(
                    "[group-unresolved] subsystem={:?} (restarting independently)",
                    e.subsystem
                );
            }
            EventKind::RestartRequested => {
                println!(
                    "[restart-requested] subsystem={:?} level={:?}",
                    e.subsystem, e.reason
                );
            }
            EventKind::SequenceStarted => {
                println!(
                    "[sequence-started] subsystem={:?} group={:?}",
                    e.subsystem, e.group
                );
            }
            EventKind::SequenceSkipped => {
                println!(
                    "[sequence-skipped] subsystem={:?} group={:?} (already restarting)",
                    e.subsystem, e.group
                );
            }
            EventKind::StateChanged => {
                println!("[state] subsystem={:?} state={:?}", e.subsystem, e.state);
            }
            EventKind::ListenerFailed => {
                println!(
                    "[listener-failed] subsystem={:?} phase={:?} err={:?}",
                    e.subsystem, e.phase, e.reason
                );
            }
            EventKind::RamdumpFailed => {
                println!(
                    "[ramdump-failed] subsystem={:?} err={:?}",
                    e.subsystem, e.reason
                );
            }
            EventKind::SequenceCompleted => {
                println!(
                    "[sequence-completed] subsystem={:?} group={:?}",
                    e.subsystem, e.group
                );
            }
            EventKind::LevelChanged => {
                println!("[level-changed] level={:?}", e.reason);
            }
            EventKind::LevelDowngraded => {
                println!("[level-downgraded] {:?}", e.reason);
            }
            EventKind::PlatformFatal => {
                println!(
                    "[platform-fatal] subsystem={:?} reason={:?}",
                    e.subsystem, e.reason
                );
            }
            EventKind::SubscriberOverflow | EventKind::SubscriberPanicked => {
                println!("[subscriber-issue] {:?} reason={:?}", e.subsystem, e.reason);
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
