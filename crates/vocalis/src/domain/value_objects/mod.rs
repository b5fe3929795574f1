//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod call_status;
mod speaker;

pub use call_status::*;
pub use speaker::*;
