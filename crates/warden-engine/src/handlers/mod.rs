//! Concrete handler implementations.
//!
//! | Handler | Role |
//! |---------|------|
//! | [`RuleHandler`] | Group-aware rule table with a permission cache |
//! | [`GlobalHandler`] | Engine-owned fallback, always consulted |
//! | [`ControllerHandler`] | Composite: folds child handlers into one vote |

mod controller;
mod global;
mod rule;

pub use controller::ControllerHandler;
pub use global::{GlobalHandler, GLOBAL_HANDLER_NAME};
pub use rule::{Group, Passive, RuleHandler};
