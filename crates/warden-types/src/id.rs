//! Identifier types for warden.
//!
//! Actors are identified by UUID. Worlds are identified by a UUID derived
//! deterministically from the world's name, so every process that knows a
//! world's name derives the same [`WorldId`] without coordination.

use serde::{Deserialize, Serialize};
use uuid::{uuid, Uuid};

/// Warden namespace UUID for deterministic UUID v5 generation.
const WARDEN_NAMESPACE: Uuid = uuid!("7c9e4b20-51d3-4f6a-9b7e-2d8c03a1f5e4");

/// Identifier for an acting entity (player, NPC, service account).
///
/// The host's user store owns the mapping between actor IDs and whatever
/// richer identity it tracks; warden only ever compares them.
///
/// # Example
///
/// ```
/// use warden_types::ActorId;
///
/// let a = ActorId::new();
/// let b = ActorId::new();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Creates a fresh random actor ID (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID supplied by the host.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for a named world.
///
/// The UUID is derived from the world name via UUID v5 (SHA-1 over the
/// warden namespace), following the same strategy as deterministic
/// builtin IDs: same name, same ID, in every process.
///
/// # Example
///
/// ```
/// use warden_types::WorldId;
///
/// let a = WorldId::named("overworld");
/// let b = WorldId::named("overworld");
/// let nether = WorldId::named("nether");
///
/// assert_eq!(a, b);
/// assert_ne!(a, nether);
/// assert_eq!(a.name(), "overworld");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId {
    uuid: Uuid,
    name: String,
}

impl WorldId {
    /// Derives the deterministic ID for a named world.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&WARDEN_NAMESPACE, name.as_bytes()),
            name,
        }
    }

    /// Returns the world's name as supplied by the host.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the derived UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.uuid
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
