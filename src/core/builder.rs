//! # Coordinator builder.
//!
//! Wires together the bus, the subscriber fan-out, the listener registry,
//! and the fatal channel, then assembles the [`Coordinator`].
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use subvisor::{CoordinatorBuilder, PlatformConfig, RestartLevel, RestartPolicy};
//!
//! # #[tokio::main] async fn main() -> Result<(), subvisor::error::RequestError> {
//! let coordinator = CoordinatorBuilder::new()
//!     .with_platform(
//!         PlatformConfig::new("msm8x60").with_order("modems", &["external_modem", "modem"]),
//!     )
//!     .with_policy(RestartPolicy {
//!         level: RestartLevel::Coupled,
//!         ..RestartPolicy::default()
//!     })
//!     .build()?;
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::core::config::CoordinatorConfig;
use crate::core::coordinator::Coordinator;
use crate::error::RequestError;
use crate::events::Bus;
use crate::fatal::{FatalChannel, FatalHook};
use crate::groups::PlatformConfig;
use crate::notify::{Listener, Notifier};
use crate::policy::RestartPolicy;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for [`Coordinator`].
///
/// All parts are optional; the defaults give a generic platform with no
/// restart orders, the conservative default policy, and no subscribers.
#[derive(Default)]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    platform: PlatformConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    listeners: Vec<(String, Arc<dyn Listener>)>,
    fatal_hook: Option<Arc<dyn FatalHook>>,
}

impl CoordinatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole coordinator configuration.
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Selects the platform (restart orders, allowed levels, downgrades).
    pub fn with_platform(mut self, platform: PlatformConfig) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the initial restart policy, keeping the rest of the config.
    pub fn with_policy(mut self, policy: RestartPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Adds an event subscriber (fed asynchronously from the bus).
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Pre-registers a lifecycle listener for a subsystem name.
    pub fn with_listener(
        mut self,
        subsystem: impl Into<String>,
        listener: Arc<dyn Listener>,
    ) -> Self {
        self.listeners.push((subsystem.into(), listener));
        self
    }

    /// Installs the platform-fatal hook.
    pub fn with_fatal_hook(mut self, hook: Arc<dyn FatalHook>) -> Self {
        self.fatal_hook = Some(hook);
        self
    }

    /// Builds the coordinator.
    ///
    /// Must be called inside a tokio runtime when subscribers are present:
    /// their worker tasks and the bus bridge are spawned here.
    ///
    /// # Errors
    /// - [`RequestError::InvalidLevel`] — the initial policy level is not
    ///   allowed on the selected platform and has no downgrade mapping
    pub fn build(self) -> Result<Arc<Coordinator>, RequestError> {
        let bus = Bus::new(self.config.bus_capacity_clamped());

        let notifier = Notifier::new();
        for (subsystem, listener) in self.listeners {
            notifier.subscribe(&subsystem, listener);
        }

        let fatal = FatalChannel::new(self.fatal_hook, bus.clone());

        if !self.subscribers.is_empty() {
            let set = SubscriberSet::new(self.subscribers, bus.clone());
            let mut rx = bus.subscribe();
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(ev) => set.emit_arc(Arc::new(ev)),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
                set.shutdown().await;
            });
        }

        Coordinator::new(self.config, self.platform, bus, notifier, fatal)
    }
}
