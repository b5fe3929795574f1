//! Vocalis API Routes
//!
//! - POST /api/calls/webhook - telephony engine event ingress
//! - GET  /api/calls - recent calls
//! - GET  /api/calls/stats - aggregate statistics
//! - GET  /api/calls/:uuid - one call with transcripts
//! - GET  /api/calls/:uuid/transcripts - ordered transcripts

pub mod call;
pub mod swagger;
pub mod webhook;
