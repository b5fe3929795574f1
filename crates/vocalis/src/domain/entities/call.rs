//! Call - Telephony Session Record
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::CallStatus;

/// Call - one session tracked from `call_started` to a terminal state.
///
/// `uuid` is the engine-assigned business key every webhook event
/// correlates on; `id` is the internal storage key and carries no
/// meaning outside persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub id: Uuid,
    pub uuid: String,
    pub caller_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Whole seconds, set once at completion, never negative.
    pub duration: Option<i32>,
    pub status: CallStatus,
    /// Open JSON object captured from the start payload; error events
    /// merge their detail in under the reserved `"error"` key.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Call {
    /// Create a new active call from a `call_started` event.
    pub fn started(
        uuid: String,
        caller_number: Option<String>,
        start_time: DateTime<Utc>,
        metadata: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            uuid,
            caller_number,
            start_time,
            end_time: None,
            duration: None,
            status: CallStatus::Active,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the call has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Seconds elapsed from `start_time` to `end_time`, clamped to zero.
    ///
    /// Clock skew or out-of-order delivery can put the end before the
    /// start; the duration is 0 in that case, never negative.
    pub fn duration_until(&self, end_time: DateTime<Utc>) -> i64 {
        (end_time - self.start_time).num_seconds().max(0)
    }

    /// Mark the call completed with a clamped duration.
    pub fn complete(&mut self, end_time: DateTime<Utc>) {
        self.duration = Some(self.duration_until(end_time) as i32);
        self.end_time = Some(end_time);
        self.status = CallStatus::Completed;
        self.updated_at = Utc::now();
    }

    /// Mark the call failed, merging the error detail into metadata.
    ///
    /// The merge is shallow: existing top-level keys other than those in
    /// `patch` are preserved.
    pub fn fail(&mut self, patch: &serde_json::Value) {
        self.status = CallStatus::Error;
        merge_metadata(&mut self.metadata, patch);
        self.updated_at = Utc::now();
    }
}

/// Shallow-merge `patch` into `target`, key by key.
///
/// A non-object target is replaced by an object first so error detail is
/// never silently dropped.
pub fn merge_metadata(target: &mut serde_json::Value, patch: &serde_json::Value) {
    if !target.is_object() {
        *target = serde_json::json!({});
    }
    if let (Some(target_map), Some(patch_map)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_map {
            target_map.insert(key.clone(), value.clone());
        }
    }
}
