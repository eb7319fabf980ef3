//! Port/protocol rules attached to address patterns.

mod port;
mod set;

pub use port::{PortRule, ANY_PORT};
pub use set::RuleSet;
