//! Membership oracle boundary.
//!
//! Handlers select a rule list by asking which of their subject groups an
//! actor belongs to. Membership may be an explicit actor set owned by the
//! handler, or it may live in an external store (the host's permission
//! plugin, an LDAP mirror). [`MembershipOracle`] is the seam: the engine
//! only ever asks "does this group contain this actor?".

use warden_types::ActorId;

/// Set-membership oracle for one subject group.
///
/// # Contract
///
/// Pure and non-blocking: called on the hot evaluation path, possibly
/// from the host's simulation thread. Implementations that front a slow
/// store must answer from their own snapshot.
pub trait MembershipOracle: Send + Sync {
    /// Returns `true` if the actor belongs to this group.
    fn contains(&self, actor: &ActorId) -> bool;
}

impl<F> MembershipOracle for F
where
    F: Fn(&ActorId) -> bool + Send + Sync,
{
    fn contains(&self, actor: &ActorId) -> bool {
        self(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn closures_are_oracles() {
        let vip = ActorId::new();
        let oracle: Arc<dyn MembershipOracle> = Arc::new(move |a: &ActorId| *a == vip);
        assert!(oracle.contains(&vip));
        assert!(!oracle.contains(&ActorId::new()));
    }
}
