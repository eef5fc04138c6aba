//! Three-valued permission votes.
//!
//! Every handler answers a query with a [`Tristate`]: Allow, Deny, or
//! Undefined ("this policy has nothing to say"). Votes inside a priority
//! tier combine with [`and`](Tristate::and).

use serde::{Deserialize, Serialize};

/// One permission vote.
///
/// # Conjunction
///
/// | `a` | `b` | `a.and(b)` |
/// |-----|-----|------------|
/// | Deny | any | Deny |
/// | any | Deny | Deny |
/// | Undefined | Allow | Undefined |
/// | Allow | Undefined | Undefined |
/// | Undefined | Undefined | Undefined |
/// | Allow | Allow | Allow |
///
/// Deny is absorbing; a tier resolves Allow only when every vote in it is
/// Allow. An Undefined vote keeps the tier undecided, which makes the
/// evaluation fall through to the next lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tristate {
    /// The action is permitted.
    Allow,
    /// The action is forbidden. Absorbing under conjunction.
    Deny,
    /// This policy does not decide.
    #[default]
    Undefined,
}

impl Tristate {
    /// Conjoins two votes. See the type-level table.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_policy::Tristate::{Allow, Deny, Undefined};
    ///
    /// assert_eq!(Allow.and(Allow), Allow);
    /// assert_eq!(Allow.and(Deny), Deny);
    /// assert_eq!(Allow.and(Undefined), Undefined);
    /// assert_eq!(Undefined.and(Deny), Deny);
    /// ```
    #[must_use]
    pub const fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Deny, _) | (_, Self::Deny) => Self::Deny,
            (Self::Undefined, _) | (_, Self::Undefined) => Self::Undefined,
            (Self::Allow, Self::Allow) => Self::Allow,
        }
    }

    /// Maps a plain boolean onto Allow/Deny.
    #[must_use]
    pub const fn from_bool(allowed: bool) -> Self {
        if allowed {
            Self::Allow
        } else {
            Self::Deny
        }
    }

    /// Returns `true` for [`Tristate::Allow`].
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Returns `true` for [`Tristate::Deny`].
    #[must_use]
    pub const fn is_deny(self) -> bool {
        matches!(self, Self::Deny)
    }

    /// Returns `true` for [`Tristate::Undefined`].
    #[must_use]
    pub const fn is_undefined(self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Looks a vote up by name (case-insensitive).
    ///
    /// Accepts the aliases `"true"` and `"false"` alongside the canonical
    /// names, matching what administrators type.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "allow" | "true" => Some(Self::Allow),
            "deny" | "false" => Some(Self::Deny),
            "undefined" | "pass" => Some(Self::Undefined),
            _ => None,
        }
    }
}

impl std::fmt::Display for Tristate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::Undefined => "undefined",
        })
    }
}
