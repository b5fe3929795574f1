//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Call: one telephony session, keyed by the engine-assigned uuid
//! - Transcript: one utterance fragment within a call
//! - CallStats: aggregate view over the call population

mod call;
mod stats;
mod transcript;

pub use call::*;
pub use stats::*;
pub use transcript::*;
