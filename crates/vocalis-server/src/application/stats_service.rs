//! Stats Application Service (Use Case)
//!
//! Aggregates the call population into summary statistics. The store does
//! the counting and averaging; the zero-completed-calls and rounding
//! rules live in `CallStats::from_parts` where they are unit-tested.

use std::sync::Arc;

use vocalis::{CallRepository, CallStats, CallStatus, DomainError};

/// Application service for aggregate statistics
pub struct StatsService<C: CallRepository> {
    calls: Arc<C>,
}

impl<C: CallRepository> StatsService<C> {
    pub fn new(calls: Arc<C>) -> Self {
        Self { calls }
    }

    /// Summary over the full call population.
    pub async fn stats(&self) -> Result<CallStats, DomainError> {
        let total = self.calls.count_all().await?;
        let active = self.calls.count_with_status(CallStatus::Active).await?;
        let completed = self.calls.count_with_status(CallStatus::Completed).await?;
        let average = self.calls.average_completed_duration().await?;

        Ok(CallStats::from_parts(total, active, completed, average))
    }
}
