//! The group-aware rule-table handler.
//!
//! A [`RuleHandler`] holds an ordered list of subject groups, each with
//! its own ordered rule list, plus a default rule list for actors that
//! match no group and a passive setting for actor-less queries. Every
//! query goes through the handler's permission cache; every
//! administrative mutation clears that cache before the write lock is
//! released, so no reader ever sees a stale answer.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use warden_policy::entry::first_match;
use warden_policy::{FlagSet, Handler, MembershipOracle, RuleEntry, Tristate};
use warden_types::{ActorId, ObjectName};

use crate::cache::{EvalCache, SubjectRef};
use crate::error::EngineError;
use crate::persist::{GroupSnapshot, HandlerSnapshot};

/// How a [`RuleHandler`] votes on queries without an actor
/// (environmental damage, machine-placed blocks).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Passive {
    /// Always allow.
    Allow,
    /// Always deny.
    Deny,
    /// Abstain ([`Tristate::Undefined`]).
    #[default]
    Passthrough,
    /// Vote as the named group would.
    Group(ObjectName),
    /// Vote per the default rule list.
    Default,
}

/// One subject group: a name, a membership source, and the rules that
/// apply to its members.
pub struct Group {
    name: ObjectName,
    members: HashSet<ActorId>,
    oracle: Option<Arc<dyn MembershipOracle>>,
    rules: Vec<RuleEntry>,
}

impl Group {
    fn new(name: ObjectName, oracle: Option<Arc<dyn MembershipOracle>>) -> Self {
        Self {
            name,
            members: HashSet::new(),
            oracle,
            rules: Vec::new(),
        }
    }

    /// The group's name.
    #[must_use]
    pub fn name(&self) -> &ObjectName {
        &self.name
    }

    fn contains(&self, actor: &ActorId) -> bool {
        self.members.contains(actor)
            || self.oracle.as_ref().is_some_and(|o| o.contains(actor))
    }
}

impl std::fmt::Debug for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name.as_str())
            .field("members", &self.members.len())
            .field("external", &self.oracle.is_some())
            .field("rules", &self.rules.len())
            .finish()
    }
}

struct RuleState {
    groups: Vec<Group>,
    default_rules: Vec<RuleEntry>,
    passive: Passive,
    cache: EvalCache,
}

/// A named, prioritized rule-table policy unit.
///
/// # Subjects
///
/// An actor resolves to the *first* group (in declared order) that
/// contains them, falling back to the default rule list. The resolution
/// is cached per actor; editing groups invalidates it.
///
/// # Example
///
/// ```
/// use warden_engine::{Passive, RuleHandler};
/// use warden_policy::{Flag, FlagSet, Handler, RuleEntry, Tristate};
/// use warden_types::ObjectName;
///
/// let handler = RuleHandler::new(ObjectName::new("shield")?, 10);
/// handler.push_default_rule(RuleEntry::new(
///     FlagSet::of(&[Flag::Damage]),
///     Tristate::Deny,
/// ));
///
/// let damage = FlagSet::lineage_of(&[Flag::Damage]);
/// assert_eq!(handler.evaluate(None, damage), Tristate::Undefined); // passthrough
/// handler.set_passive(Passive::Default)?;
/// assert_eq!(handler.evaluate(None, damage), Tristate::Deny);
/// # Ok::<(), warden_engine::EngineError>(())
/// ```
pub struct RuleHandler {
    name: ObjectName,
    priority: AtomicI32,
    enabled: AtomicBool,
    state: RwLock<RuleState>,
}

impl RuleHandler {
    /// Creates an empty handler: no groups, no rules, passive
    /// passthrough.
    #[must_use]
    pub fn new(name: ObjectName, priority: i32) -> Self {
        Self {
            name,
            priority: AtomicI32::new(priority),
            enabled: AtomicBool::new(true),
            state: RwLock::new(RuleState {
                groups: Vec::new(),
                default_rules: Vec::new(),
                passive: Passive::Passthrough,
                cache: EvalCache::default(),
            }),
        }
    }

    /// Changes the evaluation priority.
    ///
    /// Priority feeds chain ordering, not cached votes, so no
    /// invalidation is needed.
    pub fn set_priority(&self, priority: i32) {
        self.priority.store(priority, Ordering::SeqCst);
    }

    // ── Groups ───────────────────────────────────────────────

    /// Declares a new group with explicit membership. Group order is
    /// declaration order and decides subject resolution.
    pub fn add_group(&self, name: ObjectName) -> Result<(), EngineError> {
        self.add_group_inner(name, None)
    }

    /// Declares a group whose membership is answered by an external
    /// oracle in addition to any explicit members.
    pub fn add_oracle_group(
        &self,
        name: ObjectName,
        oracle: Arc<dyn MembershipOracle>,
    ) -> Result<(), EngineError> {
        self.add_group_inner(name, Some(oracle))
    }

    fn add_group_inner(
        &self,
        name: ObjectName,
        oracle: Option<Arc<dyn MembershipOracle>>,
    ) -> Result<(), EngineError> {
        let mut state = self.state.write();
        if state.groups.iter().any(|g| g.name == name) {
            return Err(EngineError::GroupExists(name.as_str().to_string()));
        }
        debug!(handler = %self.name, group = %name, "group added");
        state.groups.push(Group::new(name, oracle));
        state.cache.clear();
        Ok(())
    }

    /// Removes a group. If the passive setting referenced it, passive
    /// falls back to passthrough.
    pub fn remove_group(&self, name: &ObjectName) -> Result<(), EngineError> {
        let mut state = self.state.write();
        let before = state.groups.len();
        state.groups.retain(|g| g.name != *name);
        if state.groups.len() == before {
            return Err(EngineError::UnknownGroup(name.as_str().to_string()));
        }
        if matches!(&state.passive, Passive::Group(g) if g == name) {
            state.passive = Passive::Passthrough;
        }
        debug!(handler = %self.name, group = %name, "group removed");
        state.cache.clear();
        Ok(())
    }

    /// Adds an actor to a group.
    pub fn add_member(&self, group: &ObjectName, actor: ActorId) -> Result<(), EngineError> {
        self.with_group(group, |g| {
            g.members.insert(actor);
        })
    }

    /// Removes an actor from a group.
    pub fn remove_member(&self, group: &ObjectName, actor: &ActorId) -> Result<(), EngineError> {
        self.with_group(group, |g| {
            g.members.remove(actor);
        })
    }

    // ── Rules ────────────────────────────────────────────────

    /// Appends a rule to a group's list.
    pub fn push_group_rule(&self, group: &ObjectName, rule: RuleEntry) -> Result<(), EngineError> {
        self.with_group(group, |g| g.rules.push(rule))
    }

    /// Replaces a group's rule list.
    pub fn set_group_rules(
        &self,
        group: &ObjectName,
        rules: Vec<RuleEntry>,
    ) -> Result<(), EngineError> {
        self.with_group(group, |g| g.rules = rules)
    }

    /// Appends a rule to the default list.
    pub fn push_default_rule(&self, rule: RuleEntry) {
        let mut state = self.state.write();
        state.default_rules.push(rule);
        state.cache.clear();
    }

    /// Replaces the default rule list.
    pub fn set_default_rules(&self, rules: Vec<RuleEntry>) {
        let mut state = self.state.write();
        state.default_rules = rules;
        state.cache.clear();
    }

    /// Drops every rule from every list.
    pub fn clear_rules(&self) {
        let mut state = self.state.write();
        for group in &mut state.groups {
            group.rules.clear();
        }
        state.default_rules.clear();
        debug!(handler = %self.name, "rules cleared");
        state.cache.clear();
    }

    // ── Passive setting ──────────────────────────────────────

    /// Sets the vote for actor-less queries. A group reference must name
    /// an existing group.
    pub fn set_passive(&self, passive: Passive) -> Result<(), EngineError> {
        let mut state = self.state.write();
        if let Passive::Group(name) = &passive {
            if !state.groups.iter().any(|g| g.name == *name) {
                return Err(EngineError::UnknownGroup(name.as_str().to_string()));
            }
        }
        debug!(handler = %self.name, passive = ?passive, "passive setting changed");
        state.passive = passive;
        state.cache.clear();
        Ok(())
    }

    /// The current passive setting.
    #[must_use]
    pub fn passive(&self) -> Passive {
        self.state.read().passive.clone()
    }

    /// Declared group names, in resolution order.
    #[must_use]
    pub fn group_names(&self) -> Vec<ObjectName> {
        self.state
            .read()
            .groups
            .iter()
            .map(|g| g.name.clone())
            .collect()
    }

    // ── Persistence ──────────────────────────────────────────

    /// Serializable snapshot of rules, groups, and the passive setting.
    ///
    /// Oracle-backed groups snapshot their explicit members and are
    /// marked external; the host re-attaches oracles after restore.
    #[must_use]
    pub fn snapshot(&self) -> HandlerSnapshot {
        let state = self.state.read();
        HandlerSnapshot {
            name: self.name.clone(),
            priority: self.priority(),
            enabled: self.is_enabled(),
            groups: state
                .groups
                .iter()
                .map(|g| {
                    let mut members: Vec<ActorId> = g.members.iter().copied().collect();
                    members.sort();
                    GroupSnapshot {
                        name: g.name.clone(),
                        external: g.oracle.is_some(),
                        members,
                        rules: g.rules.clone(),
                    }
                })
                .collect(),
            default_rules: state.default_rules.clone(),
            passive: state.passive.clone(),
        }
    }

    /// Replaces this handler's state from a snapshot, clearing the
    /// cache.
    ///
    /// A freshly-empty snapshot (what the persistence collaborator
    /// produces after discarding a corrupt unit) leaves a valid, empty
    /// handler.
    pub fn restore(&self, snapshot: &HandlerSnapshot) {
        let mut state = self.state.write();
        state.groups = snapshot
            .groups
            .iter()
            .map(|g| Group {
                name: g.name.clone(),
                members: g.members.iter().copied().collect(),
                oracle: None,
                rules: g.rules.clone(),
            })
            .collect();
        state.default_rules = snapshot.default_rules.clone();
        let passive_valid = match &snapshot.passive {
            Passive::Group(name) => state.groups.iter().any(|g| g.name == *name),
            _ => true,
        };
        state.passive = if passive_valid {
            snapshot.passive.clone()
        } else {
            Passive::Passthrough
        };
        self.priority.store(snapshot.priority, Ordering::SeqCst);
        self.enabled.store(snapshot.enabled, Ordering::SeqCst);
        debug!(handler = %self.name, "state restored from snapshot");
        state.cache.clear();
    }

    /// Builds a handler from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &HandlerSnapshot) -> Arc<Self> {
        let handler = Arc::new(Self::new(snapshot.name.clone(), snapshot.priority));
        handler.restore(snapshot);
        handler
    }

    fn with_group(
        &self,
        group: &ObjectName,
        f: impl FnOnce(&mut Group),
    ) -> Result<(), EngineError> {
        let mut state = self.state.write();
        let Some(g) = state.groups.iter_mut().find(|g| g.name == *group) else {
            return Err(EngineError::UnknownGroup(group.as_str().to_string()));
        };
        f(g);
        state.cache.clear();
        Ok(())
    }
}

impl RuleState {
    fn cached(&self, actor: Option<&ActorId>, flags: FlagSet) -> Option<Tristate> {
        match actor {
            None => self.cache.passive(flags),
            Some(actor) => {
                let subject = self.cache.subject(actor)?;
                self.cache.vote(subject, flags)
            }
        }
    }

    fn evaluate_and_store(&mut self, actor: Option<&ActorId>, flags: FlagSet) -> Tristate {
        match actor {
            None => {
                if let Some(hit) = self.cache.passive(flags) {
                    return hit;
                }
                let vote = self.passive_vote(flags);
                self.cache.store_passive(flags, vote);
                vote
            }
            Some(actor) => {
                let subject = match self.cache.subject(actor) {
                    Some(subject) => subject.clone(),
                    None => {
                        let subject = self.resolve_subject(actor);
                        self.cache.store_subject(*actor, subject.clone());
                        subject
                    }
                };
                if let Some(hit) = self.cache.vote(&subject, flags) {
                    return hit;
                }
                let vote = self.subject_vote(&subject, flags);
                self.cache.store_vote(&subject, flags, vote);
                vote
            }
        }
    }

    fn resolve_subject(&self, actor: &ActorId) -> SubjectRef {
        self.groups
            .iter()
            .find(|g| g.contains(actor))
            .map_or(SubjectRef::Default, |g| {
                SubjectRef::Group(g.name.key().to_string())
            })
    }

    fn subject_vote(&self, subject: &SubjectRef, flags: FlagSet) -> Tristate {
        match subject {
            SubjectRef::Group(key) => self
                .groups
                .iter()
                .find(|g| g.name.key() == key)
                .map_or(Tristate::Undefined, |g| first_match(&g.rules, flags)),
            SubjectRef::Default => first_match(&self.default_rules, flags),
        }
    }

    fn passive_vote(&self, flags: FlagSet) -> Tristate {
        match &self.passive {
            Passive::Allow => Tristate::Allow,
            Passive::Deny => Tristate::Deny,
            Passive::Passthrough => Tristate::Undefined,
            Passive::Group(name) => self
                .groups
                .iter()
                .find(|g| g.name == *name)
                .map_or(Tristate::Undefined, |g| first_match(&g.rules, flags)),
            Passive::Default => first_match(&self.default_rules, flags),
        }
    }
}

impl Handler for RuleHandler {
    fn name(&self) -> &ObjectName {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority.load(Ordering::SeqCst)
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn evaluate(&self, actor: Option<&ActorId>, flags: FlagSet) -> Tristate {
        // Warm path: read lock only, no allocation.
        {
            let state = self.state.read();
            if let Some(hit) = state.cached(actor, flags) {
                return hit;
            }
        }
        // Miss: recompute from current rules and store, under the same
        // write lock mutations use.
        self.state.write().evaluate_and_store(actor, flags)
    }
}

impl std::fmt::Debug for RuleHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("RuleHandler")
            .field("name", &self.name.as_str())
            .field("priority", &self.priority())
            .field("enabled", &self.is_enabled())
            .field("groups", &state.groups)
            .field("default_rules", &state.default_rules.len())
            .field("passive", &state.passive)
            .finish()
    }
}
