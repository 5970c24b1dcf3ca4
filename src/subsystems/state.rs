//! Lifecycle states of a registered subsystem.

/// Lifecycle state of a registered subsystem.
///
/// The conceptual cycle is `Online → Crashed → Offline → Online`: a crash
/// report moves the subsystem to `Crashed`, the shutdown phase to `Offline`,
/// and a successful powerup back to `Online`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsystemState {
    /// Shut down; not currently running.
    Offline,
    /// Running normally.
    Online,
    /// Crash reported; restart claimed but shutdown has not completed yet.
    Crashed,
}

impl SubsystemState {
    /// Returns the uppercase display form used by the introspection surface.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubsystemState::Offline => "OFFLINE",
            SubsystemState::Online => "ONLINE",
            SubsystemState::Crashed => "CRASHED",
        }
    }
}

impl std::fmt::Display for SubsystemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
