//! Rule entries.

use serde::{Deserialize, Serialize};

use crate::flagset::FlagSet;
use crate::tristate::Tristate;

/// One rule in a handler's rule table: "if all of these flags are
/// present, vote this way".
///
/// Rule lists are ordered; the first matching entry decides and the rest
/// are not consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Flags that must all be present for the entry to match.
    pub flags: FlagSet,
    /// The vote produced on a match.
    pub outcome: Tristate,
}

impl RuleEntry {
    /// Creates a rule entry.
    #[must_use]
    pub const fn new(flags: FlagSet, outcome: Tristate) -> Self {
        Self { flags, outcome }
    }

    /// Returns `true` if this entry matches the queried set.
    #[must_use]
    pub fn matches(&self, queried: FlagSet) -> bool {
        queried.contains_all(self.flags)
    }
}

/// Scans a rule list in declared order; the first matching entry wins.
///
/// No match yields [`Tristate::Undefined`].
#[must_use]
pub fn first_match(rules: &[RuleEntry], queried: FlagSet) -> Tristate {
    rules
        .iter()
        .find(|entry| entry.matches(queried))
        .map_or(Tristate::Undefined, |entry| entry.outcome)
}

impl std::fmt::Display for RuleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.flags, self.outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;

    fn damage() -> FlagSet {
        FlagSet::lineage_of(&[Flag::Damage])
    }

    #[test]
    fn entry_matches_on_subset() {
        let entry = RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Deny);
        assert!(entry.matches(damage()));
        assert!(!entry.matches(FlagSet::of(&[Flag::Root, Flag::Spawn])));
    }

    #[test]
    fn first_match_wins() {
        let rules = [
            RuleEntry::new(FlagSet::of(&[Flag::Damage, Flag::Player]), Tristate::Deny),
            RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Allow),
            RuleEntry::new(FlagSet::of(&[Flag::Root]), Tristate::Deny),
        ];

        // No player flag: falls past the first entry to the second.
        assert_eq!(first_match(&rules, damage()), Tristate::Allow);

        // Player flag present: first entry decides, third never consulted.
        let player_damage = FlagSet::lineage_of(&[Flag::Damage, Flag::Player]);
        assert_eq!(first_match(&rules, player_damage), Tristate::Deny);
    }

    #[test]
    fn no_match_is_undefined() {
        let rules = [RuleEntry::new(FlagSet::of(&[Flag::Spawn]), Tristate::Deny)];
        assert_eq!(first_match(&rules, damage()), Tristate::Undefined);
        assert_eq!(first_match(&[], damage()), Tristate::Undefined);
    }

    #[test]
    fn empty_requirement_matches_everything() {
        let rules = [RuleEntry::new(FlagSet::empty(), Tristate::Allow)];
        assert_eq!(first_match(&rules, FlagSet::empty()), Tristate::Allow);
        assert_eq!(first_match(&rules, damage()), Tristate::Allow);
    }

    #[test]
    fn display() {
        let entry = RuleEntry::new(FlagSet::of(&[Flag::Root, Flag::Damage]), Tristate::Deny);
        assert_eq!(entry.to_string(), "root | damage -> deny");
    }

    #[test]
    fn serde_roundtrip() {
        let entry = RuleEntry::new(FlagSet::of(&[Flag::Damage]), Tristate::Allow);
        let json = serde_json::to_string(&entry).expect("serialize");
        let parsed: RuleEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, entry);
    }
}
