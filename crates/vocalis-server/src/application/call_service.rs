//! Call Application Service (Use Case)
//!
//! Drives one webhook event through normalize -> reduce -> conditional
//! write, and serves the read-side queries. The reducer decides what
//! should happen; this service makes it durable. Conditional writes mean
//! a decision that loses a race against a concurrent delivery degrades
//! to the same idempotent no-op the reducer prescribes for stale events,
//! so the sender always gets a success acknowledgement either way.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use vocalis::{
    reduce, Call, CallRepository, DomainError, EventKind, NormalizedEvent, SkipReason, Transcript,
    TranscriptRepository, Transition,
};

/// Page size cap for call listings.
const RECENT_CALLS_LIMIT: i64 = 50;

/// What ingesting one event amounted to. Every variant is acknowledged
/// to the sender as success; only normalization and store failures are
/// surfaced as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Started,
    DuplicateStart,
    TranscriptionSaved,
    /// Transcript stored for an identifier with no call record yet.
    OrphanTranscription,
    Ended,
    AlreadyEnded,
    ErrorRecorded,
    /// Error event with nothing to attach to.
    NothingToFail,
    /// Unrecognized event kind; nothing touched.
    Ignored,
}

impl IngestOutcome {
    /// Acknowledgement message for the webhook response.
    pub fn message(&self) -> &'static str {
        match self {
            IngestOutcome::Started => "Call started",
            IngestOutcome::DuplicateStart => "Call already exists",
            IngestOutcome::TranscriptionSaved | IngestOutcome::OrphanTranscription => {
                "Transcription saved"
            }
            IngestOutcome::Ended => "Call ended",
            IngestOutcome::AlreadyEnded => "Call already ended",
            IngestOutcome::ErrorRecorded => "Error logged",
            IngestOutcome::NothingToFail => "Error logged",
            IngestOutcome::Ignored => "Event ignored",
        }
    }

    /// Whether the event was absorbed without being interpreted.
    pub fn ignored(&self) -> bool {
        matches!(self, IngestOutcome::Ignored)
    }
}

/// Application service for call lifecycle ingestion and queries
pub struct CallService<C: CallRepository, T: TranscriptRepository> {
    calls: Arc<C>,
    transcripts: Arc<T>,
}

impl<C: CallRepository, T: TranscriptRepository> CallService<C, T> {
    pub fn new(calls: Arc<C>, transcripts: Arc<T>) -> Self {
        Self { calls, transcripts }
    }

    /// Ingest one raw webhook body.
    ///
    /// `received_at` backs every timestamp the payload does not supply.
    pub async fn ingest(
        &self,
        raw: &Value,
        received_at: DateTime<Utc>,
    ) -> Result<IngestOutcome, DomainError> {
        let event = NormalizedEvent::from_payload(raw, received_at)?;

        // Unrecognized kinds are acknowledged without touching the store.
        if let EventKind::Unknown { kind, .. } = &event.kind {
            tracing::warn!(
                call_uuid = %event.call_uuid,
                kind = kind.as_deref().unwrap_or("<missing>"),
                "Ignoring unknown webhook event kind"
            );
            return Ok(IngestOutcome::Ignored);
        }

        let current = self.calls.find_by_uuid(&event.call_uuid).await?;

        match reduce(current.as_ref(), &event) {
            Transition::CreateCall(call) => {
                if self.calls.create_if_absent(&call).await? {
                    tracing::info!(call_uuid = %call.uuid, "Call started");
                    Ok(IngestOutcome::Started)
                } else {
                    // Lost a race against a concurrent call_started.
                    tracing::warn!(call_uuid = %call.uuid, "Duplicate call_started absorbed");
                    Ok(IngestOutcome::DuplicateStart)
                }
            }

            Transition::AppendTranscript {
                transcript,
                call_known,
            } => {
                if !call_known {
                    tracing::warn!(
                        call_uuid = %transcript.call_uuid,
                        "Transcription for unknown call; storing anyway"
                    );
                }
                self.transcripts.append(&transcript).await?;
                tracing::info!(call_uuid = %transcript.call_uuid, "Transcription saved");
                if call_known {
                    Ok(IngestOutcome::TranscriptionSaved)
                } else {
                    Ok(IngestOutcome::OrphanTranscription)
                }
            }

            Transition::CompleteCall {
                call_uuid,
                end_time,
                duration_secs,
            } => {
                if self
                    .calls
                    .complete_if_active(&call_uuid, end_time, duration_secs)
                    .await?
                {
                    tracing::info!(call_uuid = %call_uuid, duration_secs, "Call ended");
                    Ok(IngestOutcome::Ended)
                } else {
                    tracing::warn!(call_uuid = %call_uuid, "Duplicate call_ended absorbed");
                    Ok(IngestOutcome::AlreadyEnded)
                }
            }

            Transition::RecordError { call_uuid, patch } => {
                if self.calls.mark_error(&call_uuid, &patch).await? {
                    tracing::error!(call_uuid = %call_uuid, detail = %patch, "Call error recorded");
                    Ok(IngestOutcome::ErrorRecorded)
                } else {
                    tracing::warn!(call_uuid = %call_uuid, "Error event after completion absorbed");
                    Ok(IngestOutcome::NothingToFail)
                }
            }

            Transition::Skip(reason) => {
                match reason {
                    SkipReason::DuplicateStart => {
                        tracing::warn!(call_uuid = %event.call_uuid, "Duplicate call_started absorbed");
                        Ok(IngestOutcome::DuplicateStart)
                    }
                    SkipReason::AlreadyTerminal => {
                        tracing::warn!(call_uuid = %event.call_uuid, "Event for terminal call absorbed");
                        Ok(IngestOutcome::AlreadyEnded)
                    }
                    SkipReason::MissingCall => {
                        tracing::warn!(call_uuid = %event.call_uuid, "Event for unknown call absorbed");
                        Ok(match event.kind {
                            EventKind::Error { .. } => IngestOutcome::NothingToFail,
                            _ => IngestOutcome::AlreadyEnded,
                        })
                    }
                    // Unknown kinds returned before the store read.
                    SkipReason::UnknownKind => Ok(IngestOutcome::Ignored),
                }
            }
        }
    }

    /// Most recent calls, newest first, capped at the page size.
    pub async fn list_calls(&self) -> Result<Vec<Call>, DomainError> {
        self.calls.list_recent(RECENT_CALLS_LIMIT).await
    }

    /// One call with its ordered transcripts, or None.
    pub async fn get_call(&self, uuid: &str) -> Result<Option<(Call, Vec<Transcript>)>, DomainError> {
        let call = match self.calls.find_by_uuid(uuid).await? {
            Some(call) => call,
            None => return Ok(None),
        };
        let transcripts = self.transcripts.find_by_call(uuid).await?;
        Ok(Some((call, transcripts)))
    }

    /// Ordered transcripts for an identifier, with or without a call row.
    pub async fn get_transcripts(&self, uuid: &str) -> Result<Vec<Transcript>, DomainError> {
        self.transcripts.find_by_call(uuid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use vocalis::CallStatus;

    /// In-memory CallRepository honoring the conditional-write contract.
    #[derive(Default)]
    struct MemCallRepository {
        calls: Mutex<HashMap<String, Call>>,
    }

    #[async_trait]
    impl CallRepository for MemCallRepository {
        async fn find_by_uuid(&self, uuid: &str) -> Result<Option<Call>, DomainError> {
            Ok(self.calls.lock().unwrap().get(uuid).cloned())
        }

        async fn create_if_absent(&self, call: &Call) -> Result<bool, DomainError> {
            let mut calls = self.calls.lock().unwrap();
            if calls.contains_key(&call.uuid) {
                return Ok(false);
            }
            calls.insert(call.uuid.clone(), call.clone());
            Ok(true)
        }

        async fn complete_if_active(
            &self,
            uuid: &str,
            end_time: DateTime<Utc>,
            _duration_secs: i64,
        ) -> Result<bool, DomainError> {
            let mut calls = self.calls.lock().unwrap();
            match calls.get_mut(uuid) {
                Some(call) if call.status == CallStatus::Active => {
                    call.complete(end_time);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn mark_error(
            &self,
            uuid: &str,
            patch: &serde_json::Value,
        ) -> Result<bool, DomainError> {
            let mut calls = self.calls.lock().unwrap();
            match calls.get_mut(uuid) {
                Some(call) if call.status != CallStatus::Completed => {
                    call.fail(patch);
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn list_recent(&self, limit: i64) -> Result<Vec<Call>, DomainError> {
            let mut calls: Vec<Call> = self.calls.lock().unwrap().values().cloned().collect();
            calls.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            calls.truncate(limit as usize);
            Ok(calls)
        }

        async fn count_all(&self) -> Result<i64, DomainError> {
            Ok(self.calls.lock().unwrap().len() as i64)
        }

        async fn count_with_status(&self, status: CallStatus) -> Result<i64, DomainError> {
            Ok(self
                .calls
                .lock()
                .unwrap()
                .values()
                .filter(|c| c.status == status)
                .count() as i64)
        }

        async fn average_completed_duration(&self) -> Result<Option<f64>, DomainError> {
            let calls = self.calls.lock().unwrap();
            let durations: Vec<f64> = calls
                .values()
                .filter(|c| c.status == CallStatus::Completed)
                .filter_map(|c| c.duration.map(f64::from))
                .collect();
            if durations.is_empty() {
                return Ok(None);
            }
            Ok(Some(durations.iter().sum::<f64>() / durations.len() as f64))
        }
    }

    /// In-memory TranscriptRepository with timestamp-ordered listing.
    #[derive(Default)]
    struct MemTranscriptRepository {
        transcripts: Mutex<Vec<Transcript>>,
    }

    impl MemTranscriptRepository {
        fn len(&self) -> usize {
            self.transcripts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TranscriptRepository for MemTranscriptRepository {
        async fn append(&self, transcript: &Transcript) -> Result<Transcript, DomainError> {
            self.transcripts.lock().unwrap().push(transcript.clone());
            Ok(transcript.clone())
        }

        async fn find_by_call(&self, call_uuid: &str) -> Result<Vec<Transcript>, DomainError> {
            let mut found: Vec<Transcript> = self
                .transcripts
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.call_uuid == call_uuid)
                .cloned()
                .collect();
            found.sort_by_key(|t| t.timestamp);
            Ok(found)
        }
    }

    fn service() -> (
        CallService<MemCallRepository, MemTranscriptRepository>,
        Arc<MemCallRepository>,
        Arc<MemTranscriptRepository>,
    ) {
        let calls = Arc::new(MemCallRepository::default());
        let transcripts = Arc::new(MemTranscriptRepository::default());
        (
            CallService::new(calls.clone(), transcripts.clone()),
            calls,
            transcripts,
        )
    }

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, secs).unwrap()
    }

    fn stamp(t: DateTime<Utc>) -> String {
        t.to_rfc3339()
    }

    #[tokio::test]
    async fn test_end_to_end_call_lifecycle() {
        let (service, calls, _) = service();

        let outcome = service
            .ingest(
                &json!({
                    "type": "call_started",
                    "uuid": "call-x",
                    "timestamp": stamp(at(0)),
                    "payload": {"caller_number": "+34600111222"}
                }),
                at(0),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Started);

        let outcome = service
            .ingest(
                &json!({
                    "type": "transcription",
                    "uuid": "call-x",
                    "timestamp": stamp(at(1)),
                    "payload": {"text": "hi", "is_user": true}
                }),
                at(1),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::TranscriptionSaved);

        let outcome = service
            .ingest(
                &json!({
                    "type": "call_ended",
                    "uuid": "call-x",
                    "timestamp": stamp(at(11))
                }),
                at(11),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Ended);

        let call = calls.find_by_uuid("call-x").await.unwrap().unwrap();
        assert_eq!(call.status, CallStatus::Completed);
        assert_eq!(call.duration, Some(11));
        assert_eq!(call.caller_number.as_deref(), Some("+34600111222"));

        let transcripts = service.get_transcripts("call-x").await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].text, "hi");
        assert_eq!(transcripts[0].speaker, vocalis::Speaker::User);
    }

    #[tokio::test]
    async fn test_duplicate_start_keeps_first_record() {
        let (service, calls, _) = service();

        service
            .ingest(
                &json!({
                    "type": "call_started",
                    "uuid": "call-x",
                    "timestamp": stamp(at(0)),
                    "payload": {"caller_number": "+1111"}
                }),
                at(0),
            )
            .await
            .unwrap();

        let outcome = service
            .ingest(
                &json!({
                    "type": "call_started",
                    "uuid": "call-x",
                    "timestamp": stamp(at(9)),
                    "payload": {"caller_number": "+2222"}
                }),
                at(9),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::DuplicateStart);

        assert_eq!(calls.count_all().await.unwrap(), 1);
        let call = calls.find_by_uuid("call-x").await.unwrap().unwrap();
        assert_eq!(call.start_time, at(0));
        assert_eq!(call.caller_number.as_deref(), Some("+1111"));
    }

    #[tokio::test]
    async fn test_duplicate_ended_does_not_recompute_duration() {
        let (service, calls, _) = service();

        service
            .ingest(
                &json!({"type": "call_started", "uuid": "call-x", "timestamp": stamp(at(0))}),
                at(0),
            )
            .await
            .unwrap();
        service
            .ingest(
                &json!({"type": "call_ended", "uuid": "call-x", "timestamp": stamp(at(11))}),
                at(11),
            )
            .await
            .unwrap();

        let outcome = service
            .ingest(
                &json!({"type": "call_ended", "uuid": "call-x", "timestamp": stamp(at(40))}),
                at(40),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::AlreadyEnded);

        let call = calls.find_by_uuid("call-x").await.unwrap().unwrap();
        assert_eq!(call.duration, Some(11));
        assert_eq!(call.end_time, Some(at(11)));
    }

    #[tokio::test]
    async fn test_error_after_completed_leaves_completed() {
        let (service, calls, _) = service();

        service
            .ingest(
                &json!({"type": "call_started", "uuid": "call-x", "timestamp": stamp(at(0))}),
                at(0),
            )
            .await
            .unwrap();
        service
            .ingest(
                &json!({"type": "call_ended", "uuid": "call-x", "timestamp": stamp(at(11))}),
                at(11),
            )
            .await
            .unwrap();

        let outcome = service
            .ingest(
                &json!({
                    "type": "error",
                    "uuid": "call-x",
                    "timestamp": stamp(at(12)),
                    "payload": {"code": "SIP-486"}
                }),
                at(12),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::AlreadyEnded);

        let call = calls.find_by_uuid("call-x").await.unwrap().unwrap();
        assert_eq!(call.status, CallStatus::Completed);
        assert!(call.metadata.get("error").is_none());
    }

    #[tokio::test]
    async fn test_error_fails_active_call_and_merges_metadata() {
        let (service, calls, _) = service();

        service
            .ingest(
                &json!({
                    "type": "call_started",
                    "uuid": "call-x",
                    "timestamp": stamp(at(0)),
                    "payload": {"trunk": "pbx-1"}
                }),
                at(0),
            )
            .await
            .unwrap();

        let outcome = service
            .ingest(
                &json!({
                    "type": "error",
                    "uuid": "call-x",
                    "payload": {"code": "SIP-486"}
                }),
                at(3),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::ErrorRecorded);

        let call = calls.find_by_uuid("call-x").await.unwrap().unwrap();
        assert_eq!(call.status, CallStatus::Error);
        assert_eq!(call.metadata["trunk"], "pbx-1");
        assert_eq!(call.metadata["error"]["code"], "SIP-486");
    }

    #[tokio::test]
    async fn test_error_without_call_is_absorbed() {
        let (service, calls, _) = service();

        let outcome = service
            .ingest(
                &json!({"type": "error", "uuid": "ghost", "payload": {"code": "SIP-503"}}),
                at(0),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::NothingToFail);
        assert_eq!(calls.count_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_orphan_transcription_is_stored() {
        let (service, _, transcripts) = service();

        let outcome = service
            .ingest(
                &json!({
                    "type": "transcription",
                    "uuid": "early-bird",
                    "timestamp": stamp(at(1)),
                    "payload": {"text": "hello?", "is_user": true}
                }),
                at(1),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::OrphanTranscription);
        assert_eq!(transcripts.len(), 1);

        let listed = service.get_transcripts("early-bird").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "hello?");
    }

    #[tokio::test]
    async fn test_transcripts_listed_in_timestamp_order() {
        let (service, _, _) = service();

        service
            .ingest(
                &json!({"type": "call_started", "uuid": "call-x", "timestamp": stamp(at(0))}),
                at(0),
            )
            .await
            .unwrap();

        // Arrival order t2, t0, t1
        for (text, secs) in [("third", 3), ("first", 1), ("second", 2)] {
            service
                .ingest(
                    &json!({
                        "type": "transcription",
                        "uuid": "call-x",
                        "timestamp": stamp(at(secs)),
                        "payload": {"text": text}
                    }),
                    at(secs),
                )
                .await
                .unwrap();
        }

        let listed = service.get_transcripts("call-x").await.unwrap();
        let texts: Vec<&str> = listed.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_unknown_kind_causes_zero_store_mutations() {
        let (service, calls, transcripts) = service();

        let outcome = service
            .ingest(
                &json!({"type": "dtmf_pressed", "uuid": "call-x", "payload": {"digit": "5"}}),
                at(0),
            )
            .await
            .unwrap();
        assert_eq!(outcome, IngestOutcome::Ignored);
        assert!(outcome.ignored());
        assert_eq!(calls.count_all().await.unwrap(), 0);
        assert_eq!(transcripts.len(), 0);
    }

    #[tokio::test]
    async fn test_malformed_event_rejected_before_store_access() {
        let (service, calls, transcripts) = service();

        let err = service
            .ingest(&json!({"type": "call_started"}), at(0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MalformedEvent(_)));
        assert_eq!(calls.count_all().await.unwrap(), 0);
        assert_eq!(transcripts.len(), 0);
    }

    #[tokio::test]
    async fn test_list_calls_newest_first() {
        let (service, _, _) = service();

        for (uuid, secs) in [("a", 10), ("b", 30), ("c", 20)] {
            service
                .ingest(
                    &json!({"type": "call_started", "uuid": uuid, "timestamp": stamp(at(secs))}),
                    at(secs),
                )
                .await
                .unwrap();
        }

        let listed = service.list_calls().await.unwrap();
        let uuids: Vec<&str> = listed.iter().map(|c| c.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_get_call_returns_call_with_transcripts() {
        let (service, _, _) = service();

        service
            .ingest(
                &json!({"type": "call_started", "uuid": "call-x", "timestamp": stamp(at(0))}),
                at(0),
            )
            .await
            .unwrap();
        service
            .ingest(
                &json!({
                    "type": "transcription",
                    "uuid": "call-x",
                    "timestamp": stamp(at(1)),
                    "payload": {"text": "hi", "is_user": true}
                }),
                at(1),
            )
            .await
            .unwrap();

        let (call, transcripts) = service.get_call("call-x").await.unwrap().unwrap();
        assert_eq!(call.uuid, "call-x");
        assert_eq!(transcripts.len(), 1);

        assert!(service.get_call("nope").await.unwrap().is_none());
    }
}
