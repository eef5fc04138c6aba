//! Persistence collaborator boundary.
//!
//! Durable storage is not the engine's concern. The engine exchanges
//! serde snapshot types with an external collaborator behind
//! [`HandlerStore`] / [`RegionStore`], keyed by object name. A
//! collaborator that detects a corrupt unit is expected to discard it
//! and hand back a freshly-empty snapshot; the engine accepts that and
//! carries on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_policy::RuleEntry;
use warden_types::{ActorId, ObjectName, Vec3, WorldId};

use crate::handlers::Passive;

/// Errors surfaced by a persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored unit could not be decoded. Collaborators recover by
    /// discarding and recreating the unit, not by propagating this to
    /// the evaluation path.
    #[error("corrupt stored object {name:?}: {reason}")]
    Corrupt {
        /// Name of the stored unit.
        name: String,
        /// Decoder's explanation.
        reason: String,
    },

    /// Underlying storage failure.
    #[error("storage error: {0}")]
    Io(String),
}

/// Serializable form of one subject group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    /// Group name.
    pub name: ObjectName,
    /// Whether membership was (partly) oracle-backed. Oracles are not
    /// serializable; the host re-attaches them after restore.
    #[serde(default)]
    pub external: bool,
    /// Explicit members.
    pub members: Vec<ActorId>,
    /// The group's rule list, in order.
    pub rules: Vec<RuleEntry>,
}

/// Serializable form of one rule handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerSnapshot {
    /// Handler name.
    pub name: ObjectName,
    /// Evaluation priority.
    pub priority: i32,
    /// Enabled flag.
    pub enabled: bool,
    /// Groups in declaration order.
    pub groups: Vec<GroupSnapshot>,
    /// Default rule list.
    pub default_rules: Vec<RuleEntry>,
    /// Passive setting.
    pub passive: Passive,
}

/// Serializable form of a region's volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSnapshot {
    /// Unbounded volume.
    Everywhere,
    /// Axis-aligned box.
    Cuboid {
        /// Minimum corner.
        min: Vec3,
        /// Maximum corner.
        max: Vec3,
    },
    /// Sphere.
    Sphere {
        /// Center point.
        center: Vec3,
        /// Radius in world units.
        radius: f64,
    },
}

/// Serializable form of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSnapshot {
    /// Region name.
    pub name: ObjectName,
    /// World scope; `None` for server-wide regions.
    pub world: Option<WorldId>,
    /// Enabled flag.
    pub enabled: bool,
    /// Geometry.
    pub volume: VolumeSnapshot,
    /// Names of linked handlers, in link order.
    pub links: Vec<ObjectName>,
}

/// Loads and saves handler definitions, keyed by name.
pub trait HandlerStore: Send + Sync {
    /// Loads a handler snapshot, `Ok(None)` if none is stored.
    fn load(&self, name: &ObjectName) -> Result<Option<HandlerSnapshot>, StoreError>;

    /// Persists a handler snapshot.
    fn save(&self, snapshot: &HandlerSnapshot) -> Result<(), StoreError>;

    /// Removes a stored handler.
    fn remove(&self, name: &ObjectName) -> Result<(), StoreError>;
}

/// Loads and saves region definitions (including their handler links),
/// keyed by name and world scope.
pub trait RegionStore: Send + Sync {
    /// Loads a region snapshot, `Ok(None)` if none is stored.
    fn load(
        &self,
        name: &ObjectName,
        world: Option<&WorldId>,
    ) -> Result<Option<RegionSnapshot>, StoreError>;

    /// Persists a region snapshot.
    fn save(&self, snapshot: &RegionSnapshot) -> Result<(), StoreError>;

    /// Removes a stored region.
    fn remove(&self, name: &ObjectName, world: Option<&WorldId>) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_policy::{Flag, FlagSet, Tristate};

    #[test]
    fn snapshots_roundtrip_through_json() {
        let snapshot = HandlerSnapshot {
            name: ObjectName::new("shield").expect("valid"),
            priority: 10,
            enabled: true,
            groups: vec![GroupSnapshot {
                name: ObjectName::new("owners").expect("valid"),
                external: false,
                members: vec![ActorId::new()],
                rules: vec![RuleEntry::new(
                    FlagSet::of(&[Flag::Damage]),
                    Tristate::Allow,
                )],
            }],
            default_rules: vec![RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny)],
            passive: Passive::Default,
        };
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let parsed: HandlerSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn region_snapshot_roundtrip() {
        let snapshot = RegionSnapshot {
            name: ObjectName::new("spawn").expect("valid"),
            world: Some(WorldId::named("overworld")),
            enabled: false,
            volume: VolumeSnapshot::Sphere {
                center: Vec3::new(0.0, 64.0, 0.0),
                radius: 32.0,
            },
            links: vec![ObjectName::new("shield").expect("valid")],
        };
        let json = serde_json::to_string(&snapshot).expect("serialize");
        let parsed: RegionSnapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn corrupt_error_names_the_unit() {
        let err = StoreError::Corrupt {
            name: "spawn".to_string(),
            reason: "truncated".to_string(),
        };
        assert!(err.to_string().contains("spawn"));
    }
}
