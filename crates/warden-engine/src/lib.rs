//! Region/handler permission resolution for world-simulation hosts.
//!
//! For every protected action at a 3-D point inside a named world, the
//! engine answers one question: is the acting entity permitted to do
//! this? It answers many times per second, deterministically, from a
//! layered model of overlapping regions that delegate policy to
//! prioritized handlers.
//!
//! # Decision Pipeline
//!
//! ```text
//! host event (world, point, actor, flags)
//!     │
//!     ▼
//! SpatialIndex ── cell buckets ──► candidate regions ── exact predicate
//!     │
//!     ▼
//! linked handlers, deduped, sorted by priority (desc), name (asc)
//!     │
//!     ▼
//! tier-by-tier conjunction of Tristate votes (warden-policy)
//!     │
//!     ▼
//! Verdict: permit / cancel / mitigate          (Undefined fails open)
//! ```
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types   (IDs, names, geometry)
//!     ↑            ↑
//! warden-policy  (Flag, FlagSet, Tristate, Handler, chain)
//!     ↑
//! warden-engine  ◄── THIS CRATE
//! (Region, CellIndex, RuleHandler + cache, Engine, dispatcher)
//! ```
//!
//! # Concurrency
//!
//! The evaluation path is synchronous, non-blocking, and read-mostly;
//! administrative mutations serialize behind write locks and clear the
//! affected handler caches before they return. See [`Engine`].

mod cache;
mod config;
mod decision;
mod engine;
mod error;
mod event;
mod handlers;
mod index;
pub mod persist;
mod region;

pub use config::{EngineConfig, DEFAULT_CELL_SIZE};
pub use decision::{DENY_MESSAGE, KILL_DENY_MESSAGE};
pub use engine::Engine;
pub use error::EngineError;
pub use event::{ActionEvent, EntityClass, Verdict};
pub use handlers::{ControllerHandler, GlobalHandler, Group, Passive, RuleHandler, GLOBAL_HANDLER_NAME};
pub use persist::{
    GroupSnapshot, HandlerSnapshot, HandlerStore, RegionSnapshot, RegionStore, StoreError,
    VolumeSnapshot,
};
pub use region::{Cuboid, Everywhere, Region, Sphere, Volume, GLOBAL_REGION_NAME};

// Re-export the policy and type vocabulary the engine API speaks in.
pub use warden_policy::{
    evaluate_chain, Flag, FlagSet, Handler, MembershipOracle, RuleEntry, Tristate,
};
pub use warden_types::{ActorId, Aabb, CellKey, NameError, ObjectName, Vec3, WorldId};
