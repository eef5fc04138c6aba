//! Bit-indexed flag sets.
//!
//! A [`FlagSet`] describes one concrete event instance — e.g. "damage to
//! a living, hostile entity" is `{root, debuff, damage, entity, living,
//! mob, hostile}`. Sets are built fresh per event, refined incrementally
//! while the target is classified, and then treated as immutable keys on
//! the evaluation path.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::flag::Flag;

bitflags! {
    /// A set of capability flags, one bit per [`Flag`].
    ///
    /// Rule matching is subset-based: a rule applies when *all* of its
    /// required flags are present in the event's set
    /// ([`contains_all`](Self::contains_all)).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FlagSet: u32 {
        const ROOT       = 1 << 0;
        const BUFF       = 1 << 1;
        const INVINCIBLE = 1 << 2;
        const UNDYING    = 1 << 3;
        const DEBUFF     = 1 << 4;
        const DAMAGE     = 1 << 5;
        const KILL       = 1 << 6;
        const INTERACT   = 1 << 7;
        const PRIMARY    = 1 << 8;
        const SECONDARY  = 1 << 9;
        const BLOCK      = 1 << 10;
        const CHANGE     = 1 << 11;
        const PLACE      = 1 << 12;
        const BREAK      = 1 << 13;
        const MODIFY     = 1 << 14;
        const SPAWN      = 1 << 15;
        const EXPLOSION  = 1 << 16;
        const ENTITY     = 1 << 17;
        const LIVING     = 1 << 18;
        const MOB        = 1 << 19;
        const HOSTILE    = 1 << 20;
        const PASSIVE    = 1 << 21;
        const HUMAN      = 1 << 22;
        const PLAYER     = 1 << 23;
    }
}

impl FlagSet {
    /// Builds a set from the exact flags given, nothing more.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_policy::{Flag, FlagSet};
    ///
    /// let set = FlagSet::of(&[Flag::Root, Flag::Damage]);
    /// assert_eq!(set, FlagSet::ROOT | FlagSet::DAMAGE);
    /// ```
    #[must_use]
    pub fn of(flags: &[Flag]) -> Self {
        let mut set = Self::empty();
        for flag in flags {
            set |= flag.bit();
        }
        set
    }

    /// Builds a set from the given flags *and* all of their ancestors.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_policy::{Flag, FlagSet};
    ///
    /// let set = FlagSet::lineage_of(&[Flag::Damage]);
    /// assert_eq!(set, FlagSet::ROOT | FlagSet::DEBUFF | FlagSet::DAMAGE);
    /// ```
    #[must_use]
    pub fn lineage_of(flags: &[Flag]) -> Self {
        let mut set = Self::empty();
        for flag in flags {
            set |= flag.lineage();
        }
        set
    }

    /// Adds a single flag.
    pub fn add(&mut self, flag: Flag) {
        *self |= flag.bit();
    }

    /// Adds a flag and all of its ancestors.
    pub fn add_lineage(&mut self, flag: Flag) {
        *self |= flag.lineage();
    }

    /// Returns `true` if every flag in `required` is present in `self`.
    #[must_use]
    pub fn contains_all(self, required: Self) -> bool {
        self.contains(required)
    }

    /// The names of the flags in this set, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Flag::ALL
            .iter()
            .filter(|f| self.contains(f.bit()))
            .map(|f| f.name())
            .collect()
    }
}

impl std::fmt::Display for FlagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = self.names();
        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<T: IntoIterator<Item = Flag>>(iter: T) -> Self {
        let mut set = Self::empty();
        for flag in iter {
            set |= flag.bit();
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn of_collects_exact_flags() {
        let set = FlagSet::of(&[Flag::Root, Flag::Debuff, Flag::Damage]);
        assert!(set.contains(FlagSet::DAMAGE));
        assert!(!set.contains(FlagSet::KILL));
    }

    #[test]
    fn lineage_of_pulls_in_ancestors() {
        let set = FlagSet::lineage_of(&[Flag::Hostile, Flag::Damage]);
        for expected in [
            FlagSet::ROOT,
            FlagSet::DEBUFF,
            FlagSet::DAMAGE,
            FlagSet::ENTITY,
            FlagSet::LIVING,
            FlagSet::MOB,
            FlagSet::HOSTILE,
        ] {
            assert!(set.contains(expected), "missing {expected:?}");
        }
    }

    #[test]
    fn incremental_refinement() {
        let mut set = FlagSet::of(&[Flag::Root, Flag::Debuff, Flag::Damage, Flag::Entity]);
        set.add(Flag::Living);
        set.add(Flag::Mob);
        set.add(Flag::Hostile);
        assert!(set.contains_all(FlagSet::of(&[Flag::Damage, Flag::Hostile])));
    }

    #[test]
    fn contains_all_is_subset() {
        let event = FlagSet::lineage_of(&[Flag::Damage, Flag::Hostile]);
        assert!(event.contains_all(FlagSet::of(&[Flag::Damage])));
        assert!(event.contains_all(FlagSet::of(&[Flag::Damage, Flag::Entity])));
        assert!(!event.contains_all(FlagSet::of(&[Flag::Damage, Flag::Player])));
        // Empty requirement matches everything.
        assert!(event.contains_all(FlagSet::empty()));
    }

    #[test]
    fn names_in_declaration_order() {
        let set = FlagSet::of(&[Flag::Damage, Flag::Root, Flag::Entity]);
        assert_eq!(set.names(), vec!["root", "damage", "entity"]);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(FlagSet::empty().to_string(), "(none)");
        assert_eq!(
            FlagSet::of(&[Flag::Root, Flag::Damage]).to_string(),
            "root | damage"
        );
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = std::collections::HashMap::new();
        map.insert(FlagSet::of(&[Flag::Damage]), 1);
        assert_eq!(map.get(&FlagSet::of(&[Flag::Damage])), Some(&1));
        assert_eq!(map.get(&FlagSet::of(&[Flag::Kill])), None);
    }

    #[test]
    fn from_iterator() {
        let set: FlagSet = [Flag::Root, Flag::Spawn].into_iter().collect();
        assert_eq!(set, FlagSet::ROOT | FlagSet::SPAWN);
    }

    #[test]
    fn serde_roundtrip() {
        let set = FlagSet::of(&[Flag::Root, Flag::Damage, Flag::Entity]);
        let json = serde_json::to_string(&set).expect("serialize");
        let parsed: FlagSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, set);
    }
}
