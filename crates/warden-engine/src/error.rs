//! Engine error types.
//!
//! Only administrative operations fail; the evaluation path is total and
//! always produces a decision. Every variant carries the reason shown to
//! the administrator who issued the rejected mutation.

use thiserror::Error;
use warden_types::NameError;

/// Errors raised by administrative operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A region or handler with this name already exists in the target
    /// namespace.
    #[error("name already in use: {0:?}")]
    NameTaken(String),

    /// No region with this name.
    #[error("no such region: {0:?}")]
    UnknownRegion(String),

    /// No handler with this name.
    #[error("no such handler: {0:?}")]
    UnknownHandler(String),

    /// The world has not been loaded into the engine.
    #[error("no such world: {0:?}")]
    UnknownWorld(String),

    /// No group with this name on the target handler.
    #[error("no such group: {0:?}")]
    UnknownGroup(String),

    /// The target handler already has a group with this name.
    #[error("group already exists: {0:?}")]
    GroupExists(String),

    /// The object is engine-owned and cannot be removed or disabled.
    #[error("{0:?} is reserved and cannot be modified")]
    Reserved(String),

    /// The handler is already linked to the region.
    #[error("handler {handler:?} is already linked to region {region:?}")]
    AlreadyLinked {
        /// Target region name.
        region: String,
        /// Handler name.
        handler: String,
    },

    /// The handler is not linked to the region.
    #[error("handler {handler:?} is not linked to region {region:?}")]
    NotLinked {
        /// Target region name.
        region: String,
        /// Handler name.
        handler: String,
    },

    /// The supplied name failed validation.
    #[error(transparent)]
    Name(#[from] NameError),
}
