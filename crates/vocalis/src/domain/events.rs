//! Webhook Event Normalization
//!
//! The telephony engine delivers events at-least-once, possibly out of
//! order, and its payload schema has drifted across builds (`type` vs
//! `event` for the kind, `payload` vs `data` for the sub-object).
//! Normalization maps whatever arrives onto one tagged event type so the
//! rest of the system never branches on untyped JSON.
//!
//! Policy: an event the system cannot interpret still normalizes, as
//! `EventKind::Unknown`, and is acknowledged downstream. Rejecting it
//! would only trigger unbounded sender-side retries. The single
//! structural rejection is a missing or empty call identifier, because
//! such an event cannot be correlated to anything.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::domain::errors::DomainError;

/// One webhook event after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvent {
    /// Engine-assigned call identifier every event correlates on.
    pub call_uuid: String,
    /// Caller-supplied occurrence time, or the receipt time when the
    /// payload omits it or it cannot be parsed.
    pub occurred_at: DateTime<Utc>,
    pub kind: EventKind,
}

/// The recognized event kinds, plus a catch-all for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    CallStarted {
        caller_number: Option<String>,
        metadata: Value,
    },
    Transcription {
        text: String,
        is_user: bool,
    },
    CallEnded,
    Error {
        detail: Value,
    },
    /// Unrecognized or missing kind; carries the raw kind string and
    /// payload for observability.
    Unknown {
        kind: Option<String>,
        payload: Value,
    },
}

impl NormalizedEvent {
    /// Normalize a raw webhook body.
    ///
    /// Fails only when the call identifier is missing or empty; every
    /// other irregularity degrades to a default or to `Unknown`.
    pub fn from_payload(raw: &Value, received_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let call_uuid = raw
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                DomainError::MalformedEvent("missing or empty call identifier (uuid)".to_string())
            })?
            .to_string();

        let occurred_at = parse_timestamp(raw.get("timestamp"), received_at);

        // Newer engine builds send "type"; older ones sent "event".
        let kind_field = raw
            .get("type")
            .and_then(Value::as_str)
            .or_else(|| raw.get("event").and_then(Value::as_str));

        // Same drift for the sub-object: "payload" wins over "data".
        let payload = raw
            .get("payload")
            .or_else(|| raw.get("data"))
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let kind = match kind_field {
            Some("call_started") => EventKind::CallStarted {
                caller_number: payload
                    .get("caller_number")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                metadata: payload,
            },
            Some("transcription") => EventKind::Transcription {
                text: payload
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                is_user: payload.get("is_user").and_then(Value::as_bool).unwrap_or(false),
            },
            Some("call_ended") => EventKind::CallEnded,
            Some("error") => EventKind::Error { detail: payload },
            other => EventKind::Unknown {
                kind: other.map(str::to_string),
                payload,
            },
        };

        Ok(Self {
            call_uuid,
            occurred_at,
            kind,
        })
    }
}

/// Parse a caller-supplied timestamp, tolerating both the RFC 3339 string
/// and epoch-milliseconds number forms the engine has emitted.
fn parse_timestamp(value: Option<&Value>, received_at: DateTime<Utc>) -> DateTime<Utc> {
    match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(received_at),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or(received_at),
        _ => received_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn received_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_call_started_with_full_payload() {
        let raw = json!({
            "type": "call_started",
            "uuid": "call-1",
            "timestamp": "2025-06-01T11:59:00Z",
            "payload": {"caller_number": "+34600111222", "trunk": "pbx-1"}
        });
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.call_uuid, "call-1");
        assert_eq!(
            event.occurred_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 11, 59, 0).unwrap()
        );
        match event.kind {
            EventKind::CallStarted {
                caller_number,
                metadata,
            } => {
                assert_eq!(caller_number.as_deref(), Some("+34600111222"));
                assert_eq!(metadata["trunk"], "pbx-1");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_legacy_event_field_is_accepted() {
        let raw = json!({"event": "call_ended", "uuid": "call-2"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.kind, EventKind::CallEnded);
    }

    #[test]
    fn test_type_wins_over_event_when_both_present() {
        let raw = json!({"type": "call_ended", "event": "error", "uuid": "call-3"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.kind, EventKind::CallEnded);
    }

    #[test]
    fn test_legacy_data_field_is_accepted_as_payload() {
        let raw = json!({
            "type": "transcription",
            "uuid": "call-4",
            "data": {"text": "hola", "is_user": true}
        });
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Transcription {
                text: "hola".to_string(),
                is_user: true
            }
        );
    }

    #[test]
    fn test_transcription_tolerates_missing_fields() {
        let raw = json!({"type": "transcription", "uuid": "call-5"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(
            event.kind,
            EventKind::Transcription {
                text: String::new(),
                is_user: false
            }
        );
    }

    #[test]
    fn test_unknown_kind_normalizes_instead_of_failing() {
        let raw = json!({"type": "dtmf_pressed", "uuid": "call-6", "payload": {"digit": "5"}});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        match event.kind {
            EventKind::Unknown { kind, payload } => {
                assert_eq!(kind.as_deref(), Some("dtmf_pressed"));
                assert_eq!(payload["digit"], "5");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_missing_kind_is_unknown_not_error() {
        let raw = json!({"uuid": "call-7"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert!(matches!(event.kind, EventKind::Unknown { kind: None, .. }));
    }

    #[test]
    fn test_missing_uuid_is_rejected() {
        let raw = json!({"type": "call_started"});
        let err = NormalizedEvent::from_payload(&raw, received_at()).unwrap_err();
        assert!(matches!(err, DomainError::MalformedEvent(_)));
    }

    #[test]
    fn test_blank_uuid_is_rejected() {
        let raw = json!({"type": "call_started", "uuid": "   "});
        let err = NormalizedEvent::from_payload(&raw, received_at()).unwrap_err();
        assert!(matches!(err, DomainError::MalformedEvent(_)));
    }

    #[test]
    fn test_missing_timestamp_defaults_to_receipt_time() {
        let raw = json!({"type": "call_ended", "uuid": "call-8"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.occurred_at, received_at());
    }

    #[test]
    fn test_epoch_millis_timestamp_is_parsed() {
        let raw = json!({"type": "call_ended", "uuid": "call-9", "timestamp": 1748779200000i64});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.occurred_at.timestamp_millis(), 1748779200000);
    }

    #[test]
    fn test_garbage_timestamp_defaults_to_receipt_time() {
        let raw = json!({"type": "call_ended", "uuid": "call-10", "timestamp": "not-a-date"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.occurred_at, received_at());
    }

    #[test]
    fn test_non_object_payload_is_treated_as_empty() {
        let raw = json!({"type": "error", "uuid": "call-11", "payload": "boom"});
        let event = NormalizedEvent::from_payload(&raw, received_at()).unwrap();
        assert_eq!(event.kind, EventKind::Error { detail: json!({}) });
    }
}
