//! Tiered chain evaluation.
//!
//! The heart of the engine: given the handlers covering a point, already
//! sorted by descending priority (ties by name), fold their votes into
//! one [`Tristate`].
//!
//! # Algorithm
//!
//! Handlers sharing a priority value form a *tier*. Tiers are evaluated
//! from highest priority downward:
//!
//! 1. Conjoin every vote in the tier ([`Tristate::and`]).
//! 2. A Deny anywhere decides Deny and stops — lower tiers are never
//!    consulted.
//! 3. All-Allow decides Allow and stops.
//! 4. Any Undefined vote leaves the tier undecided; evaluation falls
//!    through to the next tier.
//! 5. No tier decides (or the chain is empty): Undefined. The caller
//!    owns the default.
//!
//! Every handler *within* a consulted tier is queried, even after the
//! tier's outcome is already determined by an earlier Deny; tiers below
//! a decided one are never queried.

use std::sync::Arc;

use warden_types::ActorId;

use crate::flagset::FlagSet;
use crate::handler::Handler;
use crate::tristate::Tristate;

/// Folds a priority-sorted handler chain into a single vote.
///
/// `handlers` must be sorted by descending [`Handler::priority`]; the
/// engine's registry produces chains in that order. Disabled handlers
/// are expected to have been filtered out already.
///
/// # Example
///
/// ```
/// use warden_policy::testing::StaticHandler;
/// use warden_policy::{evaluate_chain, FlagSet, Tristate};
///
/// // Tier 10 does not decide; tier 5 allows.
/// let chain = vec![
///     StaticHandler::arc("border", 10, Tristate::Undefined),
///     StaticHandler::arc("town", 5, Tristate::Allow),
/// ];
/// let flags = FlagSet::ROOT | FlagSet::DAMAGE;
/// assert_eq!(evaluate_chain(&chain, None, flags), Tristate::Allow);
/// ```
#[must_use]
pub fn evaluate_chain(
    handlers: &[Arc<dyn Handler>],
    actor: Option<&ActorId>,
    flags: FlagSet,
) -> Tristate {
    let mut i = 0;
    while i < handlers.len() {
        let tier = handlers[i].priority();
        let mut result = handlers[i].evaluate(actor, flags);
        i += 1;
        while i < handlers.len() && handlers[i].priority() == tier {
            result = result.and(handlers[i].evaluate(actor, flags));
            i += 1;
        }
        if !result.is_undefined() {
            return result;
        }
    }
    Tristate::Undefined
}
