//! Policy primitives for warden.
//!
//! This crate defines *what is being asked* and *how votes combine*; it
//! knows nothing about space, registries, or caching (those live in
//! `warden-engine`).
//!
//! # Decision Model
//!
//! ```text
//! event ──► FlagSet (what is being asked)
//!                │
//!                ▼
//! [Handler p=20] [Handler p=20]     ◄── tier: all votes conjoined
//!                │  (undecided? fall through)
//!                ▼
//! [Handler p=10]                    ◄── next tier
//!                │
//!                ▼
//!            Tristate (Allow / Deny / Undefined)
//! ```
//!
//! | Piece | Type | Role |
//! |-------|------|------|
//! | [`Flag`] | Enum | Atomic capability tag in an is-a-kind-of tree |
//! | [`FlagSet`] | Bitflags | The tags describing one concrete event |
//! | [`Tristate`] | Enum | One vote: Allow, Deny, or Undefined |
//! | [`RuleEntry`] | Struct | "If these flags are present, vote this way" |
//! | [`Handler`] | Trait | Named, prioritized policy unit that votes |
//! | [`evaluate_chain`] | Fn | Tier-by-tier fold of a sorted handler list |
//!
//! # Design Principles
//!
//! - **Deny wins** — a single Deny vote decides the whole evaluation.
//! - **Tiers complete before lower priorities are consulted** — an
//!   undecided tier falls through; a decided one ends the evaluation.
//! - **Trait definitions here, implementations in consumers** — the
//!   engine crate provides the concrete handlers.

pub mod chain;
pub mod entry;
pub mod flag;
pub mod flagset;
pub mod handler;
pub mod oracle;
pub mod testing;
pub mod tristate;

pub use chain::evaluate_chain;
pub use entry::{first_match, RuleEntry};
pub use flag::Flag;
pub use flagset::FlagSet;
pub use handler::Handler;
pub use oracle::MembershipOracle;
pub use tristate::Tristate;
