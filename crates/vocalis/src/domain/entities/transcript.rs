//! Transcript - Utterance Fragment
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Speaker;

/// Transcript - one utterance fragment within a call.
///
/// `call_uuid` is a soft reference: fragments may arrive before their
/// call materializes and are stored regardless, so listings keep working
/// under out-of-order delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub id: Uuid,
    pub call_uuid: String,
    pub text: String,
    pub speaker: Speaker,
    /// Ordering key for listings; fragments are returned in
    /// non-decreasing timestamp order.
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Transcript {
    /// Create a new transcript fragment.
    pub fn new(call_uuid: String, text: String, speaker: Speaker, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_uuid,
            text,
            speaker,
            timestamp,
            created_at: Utc::now(),
        }
    }
}
