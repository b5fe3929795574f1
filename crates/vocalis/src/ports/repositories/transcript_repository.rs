//! Transcript Repository Port
//!
//! Abstract interface for Transcript persistence operations.
//!
//! Appends are independent, commutative writes; they need no mutual
//! exclusion and no existing Call record.

use async_trait::async_trait;

use crate::domain::entities::Transcript;
use crate::domain::errors::DomainError;

/// Repository interface for Transcript entities
#[async_trait]
pub trait TranscriptRepository: Send + Sync {
    /// Append one fragment.
    async fn append(&self, transcript: &Transcript) -> Result<Transcript, DomainError>;

    /// All fragments for a call in non-decreasing timestamp order.
    /// Empty when the call has no fragments or does not exist.
    async fn find_by_call(&self, call_uuid: &str) -> Result<Vec<Transcript>, DomainError>;
}
