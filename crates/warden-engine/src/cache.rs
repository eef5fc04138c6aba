//! Per-handler permission cache.
//!
//! Rule-table evaluation is a linear scan; on the per-event hot path the
//! same (subject, flag-set) questions recur constantly, so every
//! [`RuleHandler`](crate::RuleHandler) memoizes its answers in three
//! layers:
//!
//! 1. **group** — per named group, flag-set → vote
//! 2. **default / passive** — flag-set → vote for actors matching no
//!    group, and for actor-less queries
//! 3. **subject** — actor → which group's cache answers for them,
//!    resolved once per actor by testing group membership in declared
//!    order
//!
//! All layers populate lazily and persist until [`EvalCache::clear`],
//! which is total and is called under the same write lock as every
//! mutation to the rules, groups, or passive setting — a reader can
//! never observe an entry computed from superseded data.

use std::collections::HashMap;

use warden_policy::{FlagSet, Tristate};
use warden_types::ActorId;

/// Which rule list answers for a resolved actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SubjectRef {
    /// The actor matched this group (lowercase key).
    Group(String),
    /// The actor matched no group.
    Default,
}

/// Lazily populated evaluation cache, owned by exactly one handler.
#[derive(Debug, Default)]
pub(crate) struct EvalCache {
    group: HashMap<String, HashMap<FlagSet, Tristate>>,
    default_subject: HashMap<FlagSet, Tristate>,
    passive: HashMap<FlagSet, Tristate>,
    subjects: HashMap<ActorId, SubjectRef>,
}

impl EvalCache {
    /// Resolved subject for an actor, if already computed.
    pub(crate) fn subject(&self, actor: &ActorId) -> Option<&SubjectRef> {
        self.subjects.get(actor)
    }

    pub(crate) fn store_subject(&mut self, actor: ActorId, subject: SubjectRef) {
        self.subjects.insert(actor, subject);
    }

    /// Cached vote for a resolved subject, if present. Read-only: a warm
    /// lookup neither allocates nor mutates.
    pub(crate) fn vote(&self, subject: &SubjectRef, flags: FlagSet) -> Option<Tristate> {
        match subject {
            SubjectRef::Group(key) => self.group.get(key)?.get(&flags).copied(),
            SubjectRef::Default => self.default_subject.get(&flags).copied(),
        }
    }

    pub(crate) fn store_vote(&mut self, subject: &SubjectRef, flags: FlagSet, vote: Tristate) {
        match subject {
            SubjectRef::Group(key) => {
                self.group
                    .entry(key.clone())
                    .or_default()
                    .insert(flags, vote);
            }
            SubjectRef::Default => {
                self.default_subject.insert(flags, vote);
            }
        }
    }

    /// Cached vote for an actor-less query, if present.
    pub(crate) fn passive(&self, flags: FlagSet) -> Option<Tristate> {
        self.passive.get(&flags).copied()
    }

    pub(crate) fn store_passive(&mut self, flags: FlagSet, vote: Tristate) {
        self.passive.insert(flags, vote);
    }

    /// Total invalidation: every layer is dropped.
    pub(crate) fn clear(&mut self) {
        self.group.clear();
        self.default_subject.clear();
        self.passive.clear();
        self.subjects.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.group.is_empty()
            && self.default_subject.is_empty()
            && self.passive.is_empty()
            && self.subjects.is_empty()
    }
}
