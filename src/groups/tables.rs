//! # Platform configuration and the restart group resolver.
//!
//! Each hardware variant ships a static table mapping subsystem names to the
//! groups that must restart together. The table is selected once at
//! initialization, compiled into [`GroupTables`], and immutable thereafter;
//! there is no process-wide mutable ordering state.
//!
//! ## Rules
//! - Resolution is a pure function of (name, compiled tables): calling it
//!   twice for the same name yields the same group identity (`Arc` equality).
//! - A subsystem belongs to at most one group; the first table listing the
//!   name wins, matching the original scan order.
//! - No match → no group: the subsystem restarts as its own singleton. The
//!   registry reports this as a warning-level signal since it usually
//!   indicates a misconfiguration.
//!
//! ## Example
//! ```
//! use subvisor::{PlatformConfig, RestartLevel};
//!
//! let platform = PlatformConfig::new("msm8x60")
//!     .with_order("all", &["external_modem", "modem", "lpass"])
//!     .allow_only(&[RestartLevel::Coupled, RestartLevel::FullReset])
//!     .with_downgrade(RestartLevel::Independent, RestartLevel::Coupled);
//! assert_eq!(platform.variant(), "msm8x60");
//! ```

use std::sync::Arc;

use crate::error::RequestError;
use crate::groups::order::RestartGroup;
use crate::policy::RestartLevel;

/// One configured restart order: a named, ordered member list.
#[derive(Debug, Clone)]
struct OrderSpec {
    name: String,
    members: Vec<String>,
}

/// Immutable platform description selected once at initialization.
///
/// Carries the restart-order tables plus the restart levels this hardware
/// variant supports. Some variants disallow per-subsystem recovery outright
/// and force [`RestartLevel::FullReset`]; others substitute a supported level
/// for an unsupported one (a downgrade).
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    variant: String,
    orders: Vec<OrderSpec>,
    allowed: Vec<RestartLevel>,
    downgrades: Vec<(RestartLevel, RestartLevel)>,
}

impl PlatformConfig {
    /// Creates a configuration for the given hardware variant with no restart
    /// orders and all levels allowed.
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            variant: variant.into(),
            orders: Vec::new(),
            allowed: vec![
                RestartLevel::Independent,
                RestartLevel::Coupled,
                RestartLevel::FullReset,
            ],
            downgrades: Vec::new(),
        }
    }

    /// Adds a restart order: subsystems listed here shut down and power up
    /// together, in the given order.
    pub fn with_order(mut self, name: impl Into<String>, members: &[&str]) -> Self {
        self.orders.push(OrderSpec {
            name: name.into(),
            members: members.iter().map(|m| (*m).to_string()).collect(),
        });
        self
    }

    /// Restricts the allowed restart levels. [`RestartLevel::FullReset`] is
    /// always kept allowed: a platform that cannot reset itself cannot
    /// recover from fatal conditions at all.
    pub fn allow_only(mut self, levels: &[RestartLevel]) -> Self {
        let mut allowed = levels.to_vec();
        if !allowed.contains(&RestartLevel::FullReset) {
            allowed.push(RestartLevel::FullReset);
        }
        self.allowed = allowed;
        self
    }

    /// Declares that requests for `from` should be served at `to` instead of
    /// being rejected.
    pub fn with_downgrade(mut self, from: RestartLevel, to: RestartLevel) -> Self {
        self.downgrades.push((from, to));
        self
    }

    /// Returns the hardware variant identifier.
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Validates a requested level against this platform.
    ///
    /// Returns the effective level plus a flag saying whether it was
    /// downgraded. Unknown-to-this-variant levels with no downgrade mapping
    /// are rejected with [`RequestError::InvalidLevel`].
    pub(crate) fn clamp_level(
        &self,
        level: RestartLevel,
    ) -> Result<(RestartLevel, bool), RequestError> {
        if self.allowed.contains(&level) {
            return Ok((level, false));
        }
        if let Some((_, to)) = self.downgrades.iter().find(|(from, _)| *from == level) {
            if self.allowed.contains(to) {
                return Ok((*to, true));
            }
        }
        Err(RequestError::InvalidLevel {
            value: level.as_str().to_string(),
        })
    }
}

impl Default for PlatformConfig {
    /// A generic platform: no restart orders, every level allowed.
    fn default() -> Self {
        Self::new("generic")
    }
}

/// Compiled restart groups for the active platform.
///
/// Built once from a [`PlatformConfig`]; the contained groups (and their
/// locks) live for the lifetime of the coordinator.
pub(crate) struct GroupTables {
    groups: Vec<Arc<RestartGroup>>,
}

impl GroupTables {
    /// Compiles the platform's order tables into live groups.
    pub(crate) fn compile(config: &PlatformConfig) -> Self {
        let groups = config
            .orders
            .iter()
            .map(|order| {
                let members: Vec<&str> = order.members.iter().map(String::as_str).collect();
                Arc::new(RestartGroup::new(order.name.as_str(), &members))
            })
            .collect();
        Self { groups }
    }

    /// Resolves a subsystem name to its group, if any table lists it.
    ///
    /// First match wins; repeat calls return the same `Arc` identity.
    pub(crate) fn resolve(&self, name: &str) -> Option<Arc<RestartGroup>> {
        self.groups.iter().find(|g| g.contains(name)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> GroupTables {
        let config = PlatformConfig::new("msm8x60")
            .with_order("all", &["external_modem", "modem", "lpass"])
            .with_order("modems", &["external_modem", "modem"]);
        GroupTables::compile(&config)
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let tables = tables();
        let a = tables.resolve("modem").expect("modem is listed");
        let b = tables.resolve("modem").expect("modem is listed");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_first_table_wins() {
        let tables = tables();
        let group = tables.resolve("external_modem").unwrap();
        assert_eq!(group.name(), "all");
    }

    #[test]
    fn test_unlisted_name_has_no_group() {
        assert!(tables().resolve("dsps").is_none());
    }

    #[test]
    fn test_clamp_rejects_disallowed_level() {
        let config = PlatformConfig::new("msm9615").allow_only(&[RestartLevel::FullReset]);
        assert!(config.clamp_level(RestartLevel::Coupled).is_err());
        assert_eq!(
            config.clamp_level(RestartLevel::FullReset).unwrap(),
            (RestartLevel::FullReset, false)
        );
    }

    #[test]
    fn test_clamp_applies_downgrade() {
        let config = PlatformConfig::new("sglte")
            .allow_only(&[RestartLevel::Coupled])
            .with_downgrade(RestartLevel::Independent, RestartLevel::Coupled);
        assert_eq!(
            config.clamp_level(RestartLevel::Independent).unwrap(),
            (RestartLevel::Coupled, true)
        );
    }
}
