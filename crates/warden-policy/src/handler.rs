//! The handler abstraction.
//!
//! A handler is a named, prioritized policy unit. Regions link handlers;
//! the engine collects the handlers of every region covering a point and
//! evaluates them tier by tier ([`crate::evaluate_chain`]).
//!
//! Trait definitions live here; concrete handlers (rule tables,
//! controllers, the global fallback) live in the engine crate.

use warden_types::{ActorId, ObjectName};

use crate::flagset::FlagSet;
use crate::tristate::Tristate;

/// A named, prioritized policy unit that votes on queries.
///
/// # Contract
///
/// - `evaluate` is total: it never fails, never blocks, and returns
///   [`Tristate::Undefined`] when the handler has nothing to say.
/// - Higher `priority` values are consulted first. Equal priorities form
///   a tier; ties between handlers are broken by name, so evaluation
///   order is deterministic.
/// - Implementations must be internally synchronized: `evaluate` takes
///   `&self` and is called concurrently with administrative mutation.
pub trait Handler: Send + Sync {
    /// The handler's unique name.
    fn name(&self) -> &ObjectName;

    /// Evaluation priority; higher is consulted first.
    fn priority(&self) -> i32;

    /// Whether this handler participates in evaluation.
    fn is_enabled(&self) -> bool;

    /// Enables or disables the handler.
    ///
    /// Implementations that cannot be disabled (the global fallback)
    /// ignore the call.
    fn set_enabled(&self, enabled: bool);

    /// Votes on a query.
    ///
    /// `actor` is `None` for actor-less events (environmental damage,
    /// dispenser placements); handlers decide those through their
    /// passive policy.
    fn evaluate(&self, actor: Option<&ActorId>, flags: FlagSet) -> Tristate;
}
