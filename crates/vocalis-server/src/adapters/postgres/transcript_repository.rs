//! PostgreSQL implementation of TranscriptRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use vocalis::{DomainError, Speaker, Transcript, TranscriptRepository};

/// PostgreSQL implementation of TranscriptRepository
pub struct PgTranscriptRepository {
    pool: PgPool,
}

impl PgTranscriptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct TranscriptRow {
    id: Uuid,
    call_uuid: String,
    text: String,
    speaker: String,
    timestamp: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<TranscriptRow> for Transcript {
    fn from(row: TranscriptRow) -> Self {
        Self {
            id: row.id,
            call_uuid: row.call_uuid,
            text: row.text,
            speaker: row.speaker.parse().unwrap_or(Speaker::Agent),
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TranscriptRepository for PgTranscriptRepository {
    async fn append(&self, transcript: &Transcript) -> Result<Transcript, DomainError> {
        let row = sqlx::query_as::<_, TranscriptRow>(
            r#"
            INSERT INTO transcripts (id, call_uuid, text, speaker, timestamp)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(transcript.id)
        .bind(&transcript.call_uuid)
        .bind(&transcript.text)
        .bind(transcript.speaker.to_string())
        .bind(transcript.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(row.into())
    }

    async fn find_by_call(&self, call_uuid: &str) -> Result<Vec<Transcript>, DomainError> {
        let rows = sqlx::query_as::<_, TranscriptRow>(
            "SELECT * FROM transcripts WHERE call_uuid = $1 ORDER BY timestamp ASC",
        )
        .bind(call_uuid)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
