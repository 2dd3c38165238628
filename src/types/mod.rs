// Shared domain types used by the detector, the router and the panel client.
// None of those layers depends on another; all import from this module.

pub mod common;
pub mod issue;

pub use common::*;
pub use issue::*;
