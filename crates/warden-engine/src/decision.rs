//! Decision dispatch.
//!
//! Turns a sorted handler chain and an [`ActionEvent`] into a
//! [`Verdict`]:
//!
//! 1. **Exemption probe** — is this actor globally exempt
//!    (`{root, buff, invincible}`)? Allow skips everything else.
//! 2. **Main probe** — the event's own flag set. Deny cancels;
//!    Undefined fails open (unregulated space imposes no restriction).
//! 3. **Lethal pass** — for death-causing actions that survived the main
//!    probe: re-probe exemption with `{…, undying}`, then the event
//!    flags extended with `kill`. A Deny here asks the host to clamp the
//!    effect rather than cancel it.
//!
//! The whole path is total: no I/O, no errors, always a verdict.

use std::sync::Arc;

use warden_policy::{evaluate_chain, Flag, FlagSet, Handler};

use crate::event::{ActionEvent, Verdict};

/// Feedback for a cancelled action.
pub const DENY_MESSAGE: &str = "You don't have permission!";

/// Feedback for a mitigated lethal action.
pub const KILL_DENY_MESSAGE: &str = "You don't have permission to kill!";

fn exempt_flags() -> FlagSet {
    FlagSet::lineage_of(&[Flag::Invincible])
}

fn undying_flags() -> FlagSet {
    FlagSet::lineage_of(&[Flag::Undying])
}

/// Reviews one event against an already-sorted handler chain.
pub(crate) fn review_chain(handlers: &[Arc<dyn Handler>], event: &ActionEvent) -> Verdict {
    let actor = event.actor.as_ref();

    if evaluate_chain(handlers, actor, exempt_flags()).is_allow() {
        return Verdict::permit();
    }

    if evaluate_chain(handlers, actor, event.flags).is_deny() {
        return Verdict::deny(DENY_MESSAGE);
    }

    if event.lethal {
        let mut kill_flags = event.flags;
        kill_flags.add_lineage(Flag::Kill);

        if evaluate_chain(handlers, actor, undying_flags()).is_allow() {
            return Verdict::permit();
        }
        if evaluate_chain(handlers, actor, kill_flags).is_deny() {
            return Verdict::mitigate(KILL_DENY_MESSAGE);
        }
    }

    Verdict::permit()
}
