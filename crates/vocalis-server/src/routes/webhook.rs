//! Webhook Routes - Telephony Engine Ingress
//!
//! Single ingress endpoint for the engine's lifecycle events. The body
//! is taken as raw JSON because the sender's schema drifts; the domain
//! normalizer decides what it means.
//!
//! Response policy: 200 with `{success: true}` for everything the
//! lifecycle table can absorb (duplicates, out-of-order, unknown kinds),
//! 400 only for structurally malformed payloads, 500 when the store is
//! unreachable so the sender retries.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;

use vocalis::DomainError;

use crate::models::WebhookAck;
use crate::AppState;

/// Ingest one lifecycle event from the telephony engine
#[utoipa::path(
    post,
    path = "/api/calls/webhook",
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Event absorbed", body = WebhookAck),
        (status = 400, description = "Malformed event", body = WebhookAck),
        (status = 500, description = "Store unavailable")
    ),
    tag = "Webhook"
)]
pub async fn handle_webhook(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookAck>, (StatusCode, Json<WebhookAck>)> {
    match state.call_service.ingest(&payload, Utc::now()).await {
        Ok(outcome) => Ok(Json(WebhookAck {
            success: true,
            message: outcome.message().to_string(),
        })),
        Err(DomainError::MalformedEvent(reason)) => {
            tracing::warn!(%reason, "Rejecting malformed webhook event");
            Err((
                StatusCode::BAD_REQUEST,
                Json(WebhookAck {
                    success: false,
                    message: reason,
                }),
            ))
        }
        Err(e) => {
            tracing::error!(error = %e, "Webhook ingestion failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookAck {
                    success: false,
                    message: e.to_string(),
                }),
            ))
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/calls/webhook", post(handle_webhook))
}
