//! Regions and their volumes.
//!
//! A [`Region`] is a named, enableable spatial scope that delegates
//! policy to an ordered list of linked handlers. Its geometry is an
//! opaque [`Volume`] predicate: the engine only asks for a coarse
//! bounding box (to place the region in index buckets) and for the exact
//! containment answer.
//!
//! Server-wide regions apply in every world; world regions carry a world
//! identity and never match elsewhere. The distinguished global regions
//! (one server-wide, one per world) are unbounded, always enabled, and
//! engine-owned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use warden_policy::Handler;
use warden_types::{Aabb, ObjectName, Vec3, WorldId};

use crate::persist::{RegionSnapshot, VolumeSnapshot};

/// Name of the engine-owned global regions (server-wide and per-world).
pub const GLOBAL_REGION_NAME: &str = "_global_";

/// Geometry oracle for one region.
///
/// # Contract
///
/// `contains` is pure, side-effect-free, and safe to call from the
/// host's simulation thread. `bounds` returning `None` marks the volume
/// as unbounded; the index then treats the region as a candidate for
/// every lookup, and `contains` remains the source of truth.
pub trait Volume: Send + Sync {
    /// Coarse bounding box, or `None` if the volume is unbounded.
    fn bounds(&self) -> Option<Aabb>;

    /// Exact containment test.
    fn contains(&self, point: Vec3) -> bool;

    /// Serializable form for the persistence collaborator, if this
    /// volume kind supports one.
    fn snapshot(&self) -> Option<VolumeSnapshot> {
        None
    }
}

/// Axis-aligned box volume.
#[derive(Debug, Clone, Copy)]
pub struct Cuboid(Aabb);

impl Cuboid {
    /// Creates a box volume spanning two corners (any order).
    #[must_use]
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self(Aabb::new(a, b))
    }
}

impl Volume for Cuboid {
    fn bounds(&self) -> Option<Aabb> {
        Some(self.0)
    }

    fn contains(&self, point: Vec3) -> bool {
        self.0.contains(point)
    }

    fn snapshot(&self) -> Option<VolumeSnapshot> {
        Some(VolumeSnapshot::Cuboid {
            min: self.0.min(),
            max: self.0.max(),
        })
    }
}

/// Spherical volume.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    center: Vec3,
    radius: f64,
}

impl Sphere {
    /// Creates a sphere volume. Negative radii contain nothing.
    #[must_use]
    pub const fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Volume for Sphere {
    fn bounds(&self) -> Option<Aabb> {
        let r = self.radius;
        Some(Aabb::new(
            Vec3::new(self.center.x - r, self.center.y - r, self.center.z - r),
            Vec3::new(self.center.x + r, self.center.y + r, self.center.z + r),
        ))
    }

    fn contains(&self, point: Vec3) -> bool {
        self.radius >= 0.0 && point.distance_squared(&self.center) <= self.radius * self.radius
    }

    fn snapshot(&self) -> Option<VolumeSnapshot> {
        Some(VolumeSnapshot::Sphere {
            center: self.center,
            radius: self.radius,
        })
    }
}

/// The unbounded volume backing global regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Everywhere;

impl Volume for Everywhere {
    fn bounds(&self) -> Option<Aabb> {
        None
    }

    fn contains(&self, _point: Vec3) -> bool {
        true
    }

    fn snapshot(&self) -> Option<VolumeSnapshot> {
        Some(VolumeSnapshot::Everywhere)
    }
}

/// A named spatial scope with linked handlers.
///
/// Linked handlers and the enabled bit are interior-mutable so that
/// administrative edits work through the shared `Arc` the engine hands
/// out; geometry and world scope are fixed at creation (recreate the
/// region to reshape it).
pub struct Region {
    name: ObjectName,
    world: Option<WorldId>,
    protected: bool,
    enabled: AtomicBool,
    volume: Arc<dyn Volume>,
    links: RwLock<Vec<Arc<dyn Handler>>>,
}

impl Region {
    /// Creates a server-wide region.
    #[must_use]
    pub fn server(name: ObjectName, volume: impl Volume + 'static) -> Self {
        Self::build(name, None, Arc::new(volume), false)
    }

    /// Creates a world-scoped region.
    #[must_use]
    pub fn world_scoped(name: ObjectName, world: WorldId, volume: impl Volume + 'static) -> Self {
        Self::build(name, Some(world), Arc::new(volume), false)
    }

    /// Creates an engine-owned global region (always enabled, unbounded).
    pub(crate) fn global(world: Option<WorldId>) -> Self {
        let name = ObjectName::new(GLOBAL_REGION_NAME).expect("global region name is valid");
        Self::build(name, world, Arc::new(Everywhere), true)
    }

    pub(crate) fn from_parts(
        name: ObjectName,
        world: Option<WorldId>,
        volume: Arc<dyn Volume>,
        enabled: bool,
    ) -> Self {
        let region = Self::build(name, world, volume, false);
        region.enabled.store(enabled, Ordering::SeqCst);
        region
    }

    fn build(
        name: ObjectName,
        world: Option<WorldId>,
        volume: Arc<dyn Volume>,
        protected: bool,
    ) -> Self {
        Self {
            name,
            world,
            protected,
            enabled: AtomicBool::new(true),
            volume,
            links: RwLock::new(Vec::new()),
        }
    }

    /// The region's name, unique in its namespace.
    #[must_use]
    pub fn name(&self) -> &ObjectName {
        &self.name
    }

    /// The world this region is scoped to, or `None` for server-wide.
    #[must_use]
    pub fn world(&self) -> Option<&WorldId> {
        self.world.as_ref()
    }

    /// Whether this region is engine-owned (global regions).
    #[must_use]
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Whether the region currently participates in lookups.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enables or disables the region. Ignored for protected regions.
    pub fn set_enabled(&self, enabled: bool) {
        if self.protected {
            return;
        }
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Coarse bounds from the volume, `None` when unbounded.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        self.volume.bounds()
    }

    /// Exact containment: the point lies in this region in this world.
    #[must_use]
    pub fn contains(&self, point: Vec3, world: &WorldId) -> bool {
        match &self.world {
            Some(w) if w != world => false,
            _ => self.volume.contains(point),
        }
    }

    /// Snapshot of the linked handler list, in link order.
    #[must_use]
    pub fn handlers(&self) -> Vec<Arc<dyn Handler>> {
        self.links.read().clone()
    }

    /// Links a handler. Returns `false` if one with the same name is
    /// already linked.
    pub fn link(&self, handler: Arc<dyn Handler>) -> bool {
        let mut links = self.links.write();
        if links.iter().any(|h| h.name() == handler.name()) {
            return false;
        }
        links.push(handler);
        true
    }

    /// Unlinks a handler by name. Returns `false` if it was not linked.
    pub fn unlink(&self, name: &ObjectName) -> bool {
        let mut links = self.links.write();
        let before = links.len();
        links.retain(|h| h.name() != name);
        links.len() < before
    }

    /// Serializable snapshot for the persistence collaborator, or
    /// `None` when the volume kind does not support one.
    #[must_use]
    pub fn snapshot(&self) -> Option<RegionSnapshot> {
        Some(RegionSnapshot {
            name: self.name.clone(),
            world: self.world.clone(),
            enabled: self.is_enabled(),
            volume: self.volume.snapshot()?,
            links: self
                .handlers()
                .iter()
                .map(|h| h.name().clone())
                .collect(),
        })
    }
}

impl VolumeSnapshot {
    /// Rebuilds the volume this snapshot describes.
    pub(crate) fn build(&self) -> Arc<dyn Volume> {
        match *self {
            Self::Everywhere => Arc::new(Everywhere),
            Self::Cuboid { min, max } => Arc::new(Cuboid::new(min, max)),
            Self::Sphere { center, radius } => Arc::new(Sphere::new(center, radius)),
        }
    }
}

impl std::fmt::Debug for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name.as_str())
            .field("world", &self.world.as_ref().map(WorldId::name))
            .field("enabled", &self.is_enabled())
            .field("protected", &self.protected)
            .field("links", &self.links.read().len())
            .finish_non_exhaustive()
    }
}
