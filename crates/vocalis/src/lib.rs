//! Vocalis Domain Library
//!
//! Core domain types and interfaces for the Vocalis call-lifecycle backend.
//! Vocalis ingests webhook events from a voice telephony engine and tracks
//! each call from `call_started` through transcription to a terminal state.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Call, Transcript, CallStats)
//!   - `value_objects/`: Immutable value types (CallStatus, Speaker)
//!   - `events`: Normalization of loosely-typed webhook payloads
//!   - `lifecycle`: The call state machine (pure reducer)
//!   - `errors`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Data access interfaces
//!
//! # Usage
//!
//! ```rust,ignore
//! use vocalis::domain::{Call, NormalizedEvent, reduce};
//! use vocalis::ports::{CallRepository, TranscriptRepository};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    reduce, Call, CallStats, CallStatus, DomainError, EventKind, NormalizedEvent, SkipReason,
    Speaker, Transcript, Transition,
};
pub use ports::{CallRepository, TranscriptRepository};
