//! Call Repository Port
//!
//! Abstract interface for Call persistence operations.
//!
//! The mutating operations are conditional writes: each one applies only
//! when its precondition still holds at the store and reports whether it
//! took effect. That is the per-identifier atomicity discipline the
//! ingestion path relies on - two concurrent `call_started` deliveries
//! materialize one row, two concurrent `call_ended` deliveries complete
//! the call once. Implementations must evaluate the precondition and the
//! write as a single atomic step.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::Call;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::CallStatus;

/// Repository interface for Call entities
#[async_trait]
pub trait CallRepository: Send + Sync {
    /// Find a call by its engine-assigned identifier.
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Call>, DomainError>;

    /// Insert the call unless one with the same identifier exists.
    /// Returns `false` (and leaves the stored call untouched) on conflict.
    async fn create_if_absent(&self, call: &Call) -> Result<bool, DomainError>;

    /// Complete the call if it is still active: set end time, duration and
    /// status in one conditional write. Returns `false` when the call is
    /// missing or no longer active.
    async fn complete_if_active(
        &self,
        uuid: &str,
        end_time: DateTime<Utc>,
        duration_secs: i64,
    ) -> Result<bool, DomainError>;

    /// Move the call to `Error` and shallow-merge `patch` into its
    /// metadata, unless it has already completed. Returns `false` when the
    /// call is missing or completed.
    async fn mark_error(&self, uuid: &str, patch: &serde_json::Value)
        -> Result<bool, DomainError>;

    /// Most recent calls by start time, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Call>, DomainError>;

    /// Total number of calls.
    async fn count_all(&self) -> Result<i64, DomainError>;

    /// Number of calls with the given status.
    async fn count_with_status(&self, status: CallStatus) -> Result<i64, DomainError>;

    /// Mean duration over completed calls, `None` when there are none.
    async fn average_completed_duration(&self) -> Result<Option<f64>, DomainError>;
}
