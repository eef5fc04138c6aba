//! Testing helpers for handler-based code.
//!
//! [`StaticHandler`] votes the same way on every query, which makes tier
//! and chain behavior easy to pin down in tests without building real
//! rule tables.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use warden_types::{ActorId, ObjectName};

use crate::flagset::FlagSet;
use crate::handler::Handler;
use crate::tristate::Tristate;

/// A handler that always returns a fixed vote.
///
/// Tracks how many times it was queried, so tests can assert on
/// short-circuiting.
///
/// # Example
///
/// ```
/// use warden_policy::testing::StaticHandler;
/// use warden_policy::{FlagSet, Handler, Tristate};
///
/// let h = StaticHandler::new("h1", 10, Tristate::Deny);
/// assert_eq!(h.evaluate(None, FlagSet::ROOT), Tristate::Deny);
/// assert_eq!(h.calls(), 1);
/// ```
pub struct StaticHandler {
    name: ObjectName,
    priority: i32,
    vote: Tristate,
    enabled: AtomicBool,
    calls: AtomicUsize,
}

impl StaticHandler {
    /// Creates a fixed-vote handler.
    ///
    /// # Panics
    ///
    /// Panics if `name` is not a valid object name (tests pass literals).
    #[must_use]
    pub fn new(name: &str, priority: i32, vote: Tristate) -> Self {
        Self {
            name: ObjectName::new(name).expect("valid test handler name"),
            priority,
            vote,
            enabled: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same, already wrapped for chain evaluation.
    #[must_use]
    pub fn arc(name: &str, priority: i32, vote: Tristate) -> Arc<dyn Handler> {
        Arc::new(Self::new(name, priority, vote))
    }

    /// Number of times `evaluate` has been called.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Handler for StaticHandler {
    fn name(&self) -> &ObjectName {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn evaluate(&self, _actor: Option<&ActorId>, _flags: FlagSet) -> Tristate {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vote
    }
}
