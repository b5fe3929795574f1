//! Call Lifecycle Reducer
//!
//! The state machine at the heart of Vocalis: a pure function from the
//! current call state and one normalized event to the transition that
//! should be applied to the stores. Keeping it pure makes every branch
//! of the transition table testable without I/O; the application layer
//! is responsible for applying the result atomically per identifier.
//!
//! Delivery is at-least-once and unordered, so most precondition
//! violations are expected traffic, not faults: they reduce to `Skip`
//! and are acknowledged as success. The status lattice is monotonic -
//! `Completed` and `Error` are terminal and nothing moves a call out of
//! them.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::domain::entities::{Call, Transcript};
use crate::domain::events::{EventKind, NormalizedEvent};
use crate::domain::value_objects::{CallStatus, Speaker};

/// The effect a normalized event has on the stores.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Materialize a new active call.
    CreateCall(Call),
    /// Append one transcript fragment. `call_known` is false when no call
    /// record existed at reduction time (out-of-order delivery); the
    /// fragment is stored anyway and the caller logs the anomaly.
    AppendTranscript {
        transcript: Transcript,
        call_known: bool,
    },
    /// Complete an active call. `duration_secs` is derived once, here,
    /// from the immutable start time and never recomputed.
    CompleteCall {
        call_uuid: String,
        end_time: DateTime<Utc>,
        duration_secs: i64,
    },
    /// Move an active (or already failed) call to `Error`, shallow-merging
    /// `patch` into its metadata.
    RecordError { call_uuid: String, patch: Value },
    /// No store mutation; acknowledged as success.
    Skip(SkipReason),
}

/// Why an event reduced to no mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `call_started` for an identifier that already has a call.
    DuplicateStart,
    /// Event for a call already in a terminal state.
    AlreadyTerminal,
    /// Event referencing an identifier with no call record.
    MissingCall,
    /// Unrecognized event kind.
    UnknownKind,
}

/// Reserved metadata key error detail is merged under.
pub const ERROR_METADATA_KEY: &str = "error";

/// Reduce one event against the current call state.
pub fn reduce(current: Option<&Call>, event: &NormalizedEvent) -> Transition {
    match &event.kind {
        EventKind::CallStarted {
            caller_number,
            metadata,
        } => match current {
            // Idempotent: never overwrite an in-flight or terminal call.
            Some(_) => Transition::Skip(SkipReason::DuplicateStart),
            None => Transition::CreateCall(Call::started(
                event.call_uuid.clone(),
                caller_number.clone(),
                event.occurred_at,
                metadata.clone(),
            )),
        },

        // Transcripts are appended regardless of call state; a fragment
        // arriving before its call_started must not be lost.
        EventKind::Transcription { text, is_user } => Transition::AppendTranscript {
            transcript: Transcript::new(
                event.call_uuid.clone(),
                text.clone(),
                Speaker::from_is_user(*is_user),
                event.occurred_at,
            ),
            call_known: current.is_some(),
        },

        EventKind::CallEnded => match current {
            None => Transition::Skip(SkipReason::MissingCall),
            Some(call) if call.is_terminal() => Transition::Skip(SkipReason::AlreadyTerminal),
            Some(call) => Transition::CompleteCall {
                call_uuid: call.uuid.clone(),
                end_time: event.occurred_at,
                duration_secs: call.duration_until(event.occurred_at),
            },
        },

        EventKind::Error { detail } => match current {
            None => Transition::Skip(SkipReason::MissingCall),
            // Completion is authoritative; a straggling error never
            // regresses it.
            Some(call) if call.status == CallStatus::Completed => {
                Transition::Skip(SkipReason::AlreadyTerminal)
            }
            Some(call) => Transition::RecordError {
                call_uuid: call.uuid.clone(),
                patch: serde_json::json!({ ERROR_METADATA_KEY: detail }),
            },
        },

        EventKind::Unknown { .. } => Transition::Skip(SkipReason::UnknownKind),
    }
}
