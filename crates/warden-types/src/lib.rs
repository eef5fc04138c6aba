//! Identifier and geometry primitives for warden.
//!
//! This crate is the leaf of the dependency graph — it defines the value
//! types that every other warden crate speaks in, and nothing else:
//!
//! ```text
//! warden-types   (ActorId, WorldId, ObjectName, Vec3, CellKey, Aabb)
//!     ↑
//! warden-policy  (Flag, FlagSet, Tristate, Handler)
//!     ↑
//! warden-engine  (Region, SpatialIndex, Engine)
//! ```
//!
//! # Design Principles
//!
//! - **Identity is data** — IDs and names carry no behavior beyond
//!   equality, ordering, and display.
//! - **Deterministic world identity** — a world name always maps to the
//!   same [`WorldId`] (UUID v5), so hosts and stores agree without
//!   coordination.
//! - **Names are case-insensitive** — [`ObjectName`] preserves the
//!   spelling it was created with but compares, hashes, and sorts by its
//!   lowercase form.

pub mod id;
pub mod name;
pub mod point;

pub use id::{ActorId, WorldId};
pub use name::{NameError, ObjectName};
pub use point::{Aabb, CellKey, Vec3};
