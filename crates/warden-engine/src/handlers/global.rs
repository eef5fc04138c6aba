//! The engine-owned global fallback handler.

use parking_lot::RwLock;
use std::collections::HashMap;

use warden_policy::entry::first_match;
use warden_policy::{FlagSet, Handler, RuleEntry, Tristate};
use warden_types::{ActorId, ObjectName};

/// Name of the engine-owned global handler.
pub const GLOBAL_HANDLER_NAME: &str = "_global_";

struct GlobalState {
    rules: Vec<RuleEntry>,
    cache: HashMap<FlagSet, Tristate>,
}

/// The always-present fallback handler.
///
/// Implicitly linked to the global region, so it is consulted for every
/// decision. It carries a single rule list that applies to every subject
/// (actors and actor-less queries alike), runs at priority 0, and can be
/// neither disabled nor removed — server-wide baseline policy lives
/// here.
pub struct GlobalHandler {
    name: ObjectName,
    state: RwLock<GlobalState>,
}

impl GlobalHandler {
    pub(crate) fn new() -> Self {
        Self {
            name: ObjectName::new(GLOBAL_HANDLER_NAME).expect("global handler name is valid"),
            state: RwLock::new(GlobalState {
                rules: Vec::new(),
                cache: HashMap::new(),
            }),
        }
    }

    /// Appends a baseline rule.
    pub fn push_rule(&self, rule: RuleEntry) {
        let mut state = self.state.write();
        state.rules.push(rule);
        state.cache.clear();
    }

    /// Replaces the baseline rule list.
    pub fn set_rules(&self, rules: Vec<RuleEntry>) {
        let mut state = self.state.write();
        state.rules = rules;
        state.cache.clear();
    }

    /// Drops every baseline rule.
    pub fn clear_rules(&self) {
        let mut state = self.state.write();
        state.rules.clear();
        state.cache.clear();
    }

    /// The current baseline rules, in order.
    #[must_use]
    pub fn rules(&self) -> Vec<RuleEntry> {
        self.state.read().rules.clone()
    }
}

impl Handler for GlobalHandler {
    fn name(&self) -> &ObjectName {
        &self.name
    }

    fn priority(&self) -> i32 {
        0
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn set_enabled(&self, _enabled: bool) {
        // The global handler cannot be disabled.
    }

    fn evaluate(&self, _actor: Option<&ActorId>, flags: FlagSet) -> Tristate {
        {
            let state = self.state.read();
            if let Some(hit) = state.cache.get(&flags) {
                return *hit;
            }
        }
        let mut state = self.state.write();
        let vote = first_match(&state.rules, flags);
        state.cache.insert(flags, vote);
        vote
    }
}

impl std::fmt::Debug for GlobalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalHandler")
            .field("rules", &self.state.read().rules.len())
            .finish()
    }
}
