//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{
    CallDetailResponse, CallResponse, StatsResponse, TranscriptResponse, WebhookAck,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Webhook ingress
        super::webhook::handle_webhook,
        // Call queries
        super::call::list_calls,
        super::call::get_stats,
        super::call::get_call,
        super::call::get_call_transcripts,
    ),
    info(
        title = "Vocalis API",
        version = "0.2.0",
        description = "Call lifecycle backend for a voice telephony engine.\n\nIngests webhook events (call_started, transcription, call_ended, error) and serves call records, transcripts and aggregate statistics.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Webhook", description = "Telephony engine event ingress"),
        (name = "Calls", description = "Call records, transcripts and statistics"),
    ),
    components(
        schemas(
            WebhookAck,
            CallResponse,
            CallDetailResponse,
            TranscriptResponse,
            StatsResponse,
        )
    ),
)]
pub struct ApiDoc;
