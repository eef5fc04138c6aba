//! Capability flags.
//!
//! A [`Flag`] is an atomic tag describing one facet of a protected action:
//! what kind of effect it has, what it targets, how the target is
//! classified. Flags form an is-a-kind-of tree rooted at [`Flag::Root`]:
//!
//! ```text
//! root
//! ├── buff ── invincible ── undying
//! ├── debuff ── damage ── kill
//! ├── interact ─┬─ primary
//! │             └─ secondary
//! ├── block ── change ─┬─ place
//! │                    ├─ break
//! │                    └─ modify
//! ├── spawn
//! ├── explosion
//! └── entity ── living ─┬─ player
//!                       └─ mob ─┬─ hostile
//!                               ├─ passive
//!                               └─ human
//! ```
//!
//! The set is closed: hosts classify their events against these variants
//! rather than registering new tags at runtime. Identity is by name and
//! names are stable.

use serde::{Deserialize, Serialize};

use crate::flagset::FlagSet;

/// An atomic capability tag.
///
/// # Example
///
/// ```
/// use warden_policy::Flag;
///
/// assert_eq!(Flag::Kill.parent(), Some(Flag::Damage));
/// assert_eq!(Flag::from_name("DAMAGE"), Some(Flag::Damage));
/// assert_eq!(Flag::Root.parent(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Universal root; present in every flag set.
    Root,
    /// Beneficial effect on the target.
    Buff,
    /// Immunity to harm.
    Invincible,
    /// Immunity to death specifically.
    Undying,
    /// Harmful effect on the target.
    Debuff,
    /// Health-reducing effect.
    Damage,
    /// Death-causing effect.
    Kill,
    /// Direct interaction with the world.
    Interact,
    /// Primary interaction (attack, punch).
    Primary,
    /// Secondary interaction (use, open).
    Secondary,
    /// The action targets a block.
    Block,
    /// The action changes a block.
    Change,
    /// Block placement.
    Place,
    /// Block destruction.
    Break,
    /// In-place block modification.
    Modify,
    /// The action spawns something.
    Spawn,
    /// The action is an explosion.
    Explosion,
    /// The action targets an entity.
    Entity,
    /// The target is alive.
    Living,
    /// The target is an autonomous mob.
    Mob,
    /// The target is hostile.
    Hostile,
    /// The target is passive.
    Passive,
    /// The target is humanoid.
    Human,
    /// The target is a player.
    Player,
}

impl Flag {
    /// Every flag, in declaration order.
    pub const ALL: [Self; 24] = [
        Self::Root,
        Self::Buff,
        Self::Invincible,
        Self::Undying,
        Self::Debuff,
        Self::Damage,
        Self::Kill,
        Self::Interact,
        Self::Primary,
        Self::Secondary,
        Self::Block,
        Self::Change,
        Self::Place,
        Self::Break,
        Self::Modify,
        Self::Spawn,
        Self::Explosion,
        Self::Entity,
        Self::Living,
        Self::Mob,
        Self::Hostile,
        Self::Passive,
        Self::Human,
        Self::Player,
    ];

    /// The flag's parent in the is-a-kind-of tree.
    ///
    /// Only [`Flag::Root`] has no parent.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Root => None,
            Self::Buff
            | Self::Debuff
            | Self::Interact
            | Self::Block
            | Self::Spawn
            | Self::Explosion
            | Self::Entity => Some(Self::Root),
            Self::Invincible => Some(Self::Buff),
            Self::Undying => Some(Self::Invincible),
            Self::Damage => Some(Self::Debuff),
            Self::Kill => Some(Self::Damage),
            Self::Primary | Self::Secondary => Some(Self::Interact),
            Self::Change => Some(Self::Block),
            Self::Place | Self::Break | Self::Modify => Some(Self::Change),
            Self::Living => Some(Self::Entity),
            Self::Mob | Self::Player => Some(Self::Living),
            Self::Hostile | Self::Passive | Self::Human => Some(Self::Mob),
        }
    }

    /// The flag's stable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Buff => "buff",
            Self::Invincible => "invincible",
            Self::Undying => "undying",
            Self::Debuff => "debuff",
            Self::Damage => "damage",
            Self::Kill => "kill",
            Self::Interact => "interact",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Block => "block",
            Self::Change => "change",
            Self::Place => "place",
            Self::Break => "break",
            Self::Modify => "modify",
            Self::Spawn => "spawn",
            Self::Explosion => "explosion",
            Self::Entity => "entity",
            Self::Living => "living",
            Self::Mob => "mob",
            Self::Hostile => "hostile",
            Self::Passive => "passive",
            Self::Human => "human",
            Self::Player => "player",
        }
    }

    /// Looks a flag up by name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL.iter().copied().find(|f| f.name() == lower)
    }

    /// This flag as a single-bit [`FlagSet`].
    #[must_use]
    pub const fn bit(self) -> FlagSet {
        match self {
            Self::Root => FlagSet::ROOT,
            Self::Buff => FlagSet::BUFF,
            Self::Invincible => FlagSet::INVINCIBLE,
            Self::Undying => FlagSet::UNDYING,
            Self::Debuff => FlagSet::DEBUFF,
            Self::Damage => FlagSet::DAMAGE,
            Self::Kill => FlagSet::KILL,
            Self::Interact => FlagSet::INTERACT,
            Self::Primary => FlagSet::PRIMARY,
            Self::Secondary => FlagSet::SECONDARY,
            Self::Block => FlagSet::BLOCK,
            Self::Change => FlagSet::CHANGE,
            Self::Place => FlagSet::PLACE,
            Self::Break => FlagSet::BREAK,
            Self::Modify => FlagSet::MODIFY,
            Self::Spawn => FlagSet::SPAWN,
            Self::Explosion => FlagSet::EXPLOSION,
            Self::Entity => FlagSet::ENTITY,
            Self::Living => FlagSet::LIVING,
            Self::Mob => FlagSet::MOB,
            Self::Hostile => FlagSet::HOSTILE,
            Self::Passive => FlagSet::PASSIVE,
            Self::Human => FlagSet::HUMAN,
            Self::Player => FlagSet::PLAYER,
        }
    }

    /// This flag plus all of its ancestors, as a [`FlagSet`].
    ///
    /// # Example
    ///
    /// ```
    /// use warden_policy::{Flag, FlagSet};
    ///
    /// let lineage = Flag::Kill.lineage();
    /// assert!(lineage.contains(FlagSet::KILL | FlagSet::DAMAGE | FlagSet::DEBUFF | FlagSet::ROOT));
    /// ```
    #[must_use]
    pub fn lineage(self) -> FlagSet {
        let mut set = self.bit();
        let mut cur = self;
        while let Some(parent) = cur.parent() {
            set |= parent.bit();
            cur = parent;
        }
        set
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_flag_reaches_root() {
        for flag in Flag::ALL {
            let mut cur = flag;
            let mut steps = 0;
            while let Some(parent) = cur.parent() {
                cur = parent;
                steps += 1;
                assert!(steps < Flag::ALL.len(), "cycle above {flag}");
            }
            assert_eq!(cur, Flag::Root);
        }
    }

    #[test]
    fn names_are_unique() {
        let names: std::collections::HashSet<_> =
            Flag::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names.len(), Flag::ALL.len());
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(Flag::from_name("damage"), Some(Flag::Damage));
        assert_eq!(Flag::from_name("DAMAGE"), Some(Flag::Damage));
        assert_eq!(Flag::from_name("Damage"), Some(Flag::Damage));
        assert_eq!(Flag::from_name("nonsense"), None);
    }

    #[test]
    fn from_name_roundtrips() {
        for flag in Flag::ALL {
            assert_eq!(Flag::from_name(flag.name()), Some(flag));
        }
    }

    #[test]
    fn lineage_of_kill() {
        let lineage = Flag::Kill.lineage();
        assert_eq!(
            lineage,
            FlagSet::KILL | FlagSet::DAMAGE | FlagSet::DEBUFF | FlagSet::ROOT
        );
    }

    #[test]
    fn lineage_of_root_is_root() {
        assert_eq!(Flag::Root.lineage(), FlagSet::ROOT);
    }

    #[test]
    fn lineage_of_hostile() {
        let lineage = Flag::Hostile.lineage();
        assert_eq!(
            lineage,
            FlagSet::HOSTILE | FlagSet::MOB | FlagSet::LIVING | FlagSet::ENTITY | FlagSet::ROOT
        );
    }

    #[test]
    fn bits_are_distinct() {
        let mut seen = FlagSet::empty();
        for flag in Flag::ALL {
            assert!(!seen.intersects(flag.bit()), "duplicate bit for {flag}");
            seen |= flag.bit();
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Flag::Damage).expect("serialize");
        assert_eq!(json, "\"damage\"");
        let parsed: Flag = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, Flag::Damage);
    }
}
