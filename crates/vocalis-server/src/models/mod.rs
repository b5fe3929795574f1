//! Vocalis API Models
//!
//! Request/response DTOs for the HTTP surface.
//! - Call: session records and detail views
//! - Transcript: ordered utterance fragments
//! - Stats: aggregate view
//! - WebhookAck: acknowledgement envelope for the ingress

mod call;

pub use call::*;
