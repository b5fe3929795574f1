//! PostgreSQL implementation of CallRepository
//!
//! The conditional writes lean on Postgres for per-identifier atomicity:
//! `ON CONFLICT DO NOTHING` for creation and status-guarded `UPDATE`s for
//! the terminal transitions, so the precondition check and the write are
//! one atomic statement even under concurrent webhook deliveries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vocalis::{Call, CallRepository, CallStatus, DomainError};

/// PostgreSQL implementation of CallRepository
pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CallRow {
    id: Uuid,
    uuid: String,
    caller_number: Option<String>,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration: Option<i32>,
    status: String,
    metadata: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CallRow> for Call {
    fn from(row: CallRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            caller_number: row.caller_number,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            status: row.status.parse().unwrap_or(CallStatus::Active),
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CallRepository for PgCallRepository {
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Call>, DomainError> {
        let row = sqlx::query_as::<_, CallRow>("SELECT * FROM calls WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn create_if_absent(&self, call: &Call) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO calls (id, uuid, caller_number, start_time, status, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (uuid) DO NOTHING
            "#,
        )
        .bind(call.id)
        .bind(&call.uuid)
        .bind(&call.caller_number)
        .bind(call.start_time)
        .bind(call.status.to_string())
        .bind(&call.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn complete_if_active(
        &self,
        uuid: &str,
        end_time: DateTime<Utc>,
        duration_secs: i64,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls
            SET end_time = $2, duration = $3, status = 'completed', updated_at = NOW()
            WHERE uuid = $1 AND status = 'active'
            "#,
        )
        .bind(uuid)
        .bind(end_time)
        .bind(duration_secs as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn mark_error(
        &self,
        uuid: &str,
        patch: &serde_json::Value,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE calls
            SET status = 'error', metadata = metadata || $2, updated_at = NOW()
            WHERE uuid = $1 AND status <> 'completed'
            "#,
        )
        .bind(uuid)
        .bind(patch)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Call>, DomainError> {
        let rows = sqlx::query_as::<_, CallRow>(
            "SELECT * FROM calls ORDER BY start_time DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_all(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM calls")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn count_with_status(&self, status: CallStatus) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM calls WHERE status = $1")
            .bind(status.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))
    }

    async fn average_completed_duration(&self) -> Result<Option<f64>, DomainError> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(duration)::float8 FROM calls WHERE status = 'completed'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))
    }
}
