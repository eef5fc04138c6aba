//! Host event surface.
//!
//! The host hands the engine one [`ActionEvent`] per protected action and
//! gets a [`Verdict`] back: permit or cancel, plus an optional request to
//! mitigate a lethal effect instead of cancelling it outright.

use warden_policy::{Flag, FlagSet};
use warden_types::{ActorId, Vec3, WorldId};

/// Closed classification of an action's target entity.
///
/// Hosts map their own entity taxonomy onto these variants; the engine
/// turns them into flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    /// A player character.
    Player,
    /// A hostile autonomous mob.
    HostileMob,
    /// A passive autonomous mob.
    PassiveMob,
    /// A humanoid autonomous mob (villager-like).
    HumanoidMob,
    /// A living entity outside the mob taxonomy.
    OtherLiving,
    /// A non-living entity (item frame, minecart).
    Inanimate,
}

impl EntityClass {
    /// The flags this classification contributes to an event.
    #[must_use]
    pub fn flags(self) -> FlagSet {
        let mut set = FlagSet::of(&[Flag::Entity]);
        match self {
            Self::Player => {
                set.add(Flag::Living);
                set.add(Flag::Player);
            }
            Self::HostileMob => {
                set.add(Flag::Living);
                set.add(Flag::Mob);
                set.add(Flag::Hostile);
            }
            Self::PassiveMob => {
                set.add(Flag::Living);
                set.add(Flag::Mob);
                set.add(Flag::Passive);
            }
            Self::HumanoidMob => {
                set.add(Flag::Living);
                set.add(Flag::Mob);
                set.add(Flag::Human);
            }
            Self::OtherLiving => set.add(Flag::Living),
            Self::Inanimate => {}
        }
        set
    }
}

/// One protected action, as reported by the host.
///
/// # Example
///
/// ```
/// use warden_engine::{ActionEvent, EntityClass};
/// use warden_policy::{Flag, FlagSet};
/// use warden_types::{Vec3, WorldId};
///
/// let event = ActionEvent::new(
///     WorldId::named("overworld"),
///     Vec3::new(10.0, 64.0, -3.0),
///     FlagSet::lineage_of(&[Flag::Damage]),
/// )
/// .classify(EntityClass::HostileMob)
/// .lethal(true);
///
/// assert!(event.flags.contains(FlagSet::HOSTILE));
/// ```
#[derive(Debug, Clone)]
pub struct ActionEvent {
    /// World the action occurs in.
    pub world: WorldId,
    /// Position of the action.
    pub point: Vec3,
    /// Acting entity, if any.
    pub actor: Option<ActorId>,
    /// What is being asked.
    pub flags: FlagSet,
    /// Whether the action would cause death.
    pub lethal: bool,
}

impl ActionEvent {
    /// Creates an actor-less, non-lethal event with the given base
    /// flags.
    #[must_use]
    pub fn new(world: WorldId, point: Vec3, flags: FlagSet) -> Self {
        Self {
            world,
            point,
            actor: None,
            flags,
            lethal: false,
        }
    }

    /// Attributes the action to an actor.
    #[must_use]
    pub fn with_actor(mut self, actor: ActorId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Refines the flag set with the target's classification.
    #[must_use]
    pub fn classify(mut self, class: EntityClass) -> Self {
        self.flags |= class.flags();
        self
    }

    /// Marks the action as death-causing.
    #[must_use]
    pub fn lethal(mut self, lethal: bool) -> Self {
        self.lethal = lethal;
        self
    }
}

/// The engine's answer to one [`ActionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the action may proceed.
    pub permitted: bool,
    /// When `true`, the action proceeds but the host should clamp its
    /// lethal effect (leave the target barely alive) instead of letting
    /// it kill.
    pub mitigate: bool,
    /// Feedback for the acting player, when the policy produced any.
    /// Delivery is the host's concern.
    pub message: Option<&'static str>,
}

impl Verdict {
    /// Plain permit.
    #[must_use]
    pub const fn permit() -> Self {
        Self {
            permitted: true,
            mitigate: false,
            message: None,
        }
    }

    /// Cancel, with feedback.
    #[must_use]
    pub const fn deny(message: &'static str) -> Self {
        Self {
            permitted: false,
            mitigate: false,
            message: Some(message),
        }
    }

    /// Permit but clamp the lethal effect.
    #[must_use]
    pub const fn mitigate(message: &'static str) -> Self {
        Self {
            permitted: true,
            mitigate: true,
            message: Some(message),
        }
    }
}
