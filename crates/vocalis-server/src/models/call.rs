//! Call DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use vocalis::{Call, CallStats, Transcript};

/// Acknowledgement returned to the webhook sender.
///
/// `success` is false only for structurally malformed payloads; every
/// absorbable condition (duplicates, unknown kinds, stale events) is
/// acknowledged with `success: true` so the sender stops retrying.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

/// One call in a listing
#[derive(Debug, Serialize, ToSchema)]
pub struct CallResponse {
    pub id: Uuid,
    pub uuid: String,
    pub caller_number: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i32>,
    pub status: String,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One call with its ordered transcripts
#[derive(Debug, Serialize, ToSchema)]
pub struct CallDetailResponse {
    #[serde(flatten)]
    pub call: CallResponse,
    pub transcripts: Vec<TranscriptResponse>,
}

/// One transcript fragment
#[derive(Debug, Serialize, ToSchema)]
pub struct TranscriptResponse {
    pub id: Uuid,
    pub call_uuid: String,
    pub text: String,
    pub speaker: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate statistics over the call population
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_calls: i64,
    pub active_calls: i64,
    pub completed_calls: i64,
    pub average_duration: i64,
}

impl CallResponse {
    pub fn from_domain(call: Call) -> Self {
        Self {
            id: call.id,
            uuid: call.uuid,
            caller_number: call.caller_number,
            start_time: call.start_time,
            end_time: call.end_time,
            duration: call.duration,
            status: call.status.to_string(),
            metadata: call.metadata,
            created_at: call.created_at,
            updated_at: call.updated_at,
        }
    }
}

impl CallDetailResponse {
    pub fn from_domain(call: Call, transcripts: Vec<Transcript>) -> Self {
        Self {
            call: CallResponse::from_domain(call),
            transcripts: transcripts
                .into_iter()
                .map(TranscriptResponse::from_domain)
                .collect(),
        }
    }
}

impl TranscriptResponse {
    pub fn from_domain(transcript: Transcript) -> Self {
        Self {
            id: transcript.id,
            call_uuid: transcript.call_uuid,
            text: transcript.text,
            speaker: transcript.speaker.to_string(),
            timestamp: transcript.timestamp,
        }
    }
}

impl StatsResponse {
    pub fn from_domain(stats: CallStats) -> Self {
        Self {
            total_calls: stats.total_calls,
            active_calls: stats.active_calls,
            completed_calls: stats.completed_calls,
            average_duration: stats.average_duration,
        }
    }
}
