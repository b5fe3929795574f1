//! Call Routes - Read-Side Queries
//!
//! All side-effect-free: listings, by-id lookup and aggregate stats over
//! the call and transcript stores.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::models::{CallDetailResponse, CallResponse, StatsResponse, TranscriptResponse};
use crate::AppState;

/// List recent calls, newest first (capped at 50)
#[utoipa::path(
    get,
    path = "/api/calls",
    responses(
        (status = 200, description = "Recent calls", body = Vec<CallResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn list_calls(
    State(state): State<AppState>,
) -> Result<Json<Vec<CallResponse>>, (axum::http::StatusCode, String)> {
    let calls = state
        .call_service
        .list_calls()
        .await
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let responses: Vec<CallResponse> = calls.into_iter().map(CallResponse::from_domain).collect();

    Ok(Json(responses))
}

/// Aggregate statistics over the call population
#[utoipa::path(
    get,
    path = "/api/calls/stats",
    responses(
        (status = 200, description = "Aggregate statistics", body = StatsResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, (axum::http::StatusCode, String)> {
    let stats = state
        .stats_service
        .stats()
        .await
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(StatsResponse::from_domain(stats)))
}

/// Get one call with its ordered transcripts
#[utoipa::path(
    get,
    path = "/api/calls/{uuid}",
    params(
        ("uuid" = String, Path, description = "Engine-assigned call identifier")
    ),
    responses(
        (status = 200, description = "Call found", body = CallDetailResponse),
        (status = 404, description = "Call not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn get_call(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<CallDetailResponse>, (axum::http::StatusCode, String)> {
    let (call, transcripts) = state
        .call_service
        .get_call(&uuid)
        .await
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .ok_or((
            axum::http::StatusCode::NOT_FOUND,
            "Call not found".to_string(),
        ))?;

    Ok(Json(CallDetailResponse::from_domain(call, transcripts)))
}

/// Get the ordered transcripts for a call identifier
///
/// Returns 200 with an empty list when no fragments exist; the call
/// record itself is not required.
#[utoipa::path(
    get,
    path = "/api/calls/{uuid}/transcripts",
    params(
        ("uuid" = String, Path, description = "Engine-assigned call identifier")
    ),
    responses(
        (status = 200, description = "Ordered transcripts", body = Vec<TranscriptResponse>),
        (status = 500, description = "Internal server error")
    ),
    tag = "Calls"
)]
pub async fn get_call_transcripts(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> Result<Json<Vec<TranscriptResponse>>, (axum::http::StatusCode, String)> {
    let transcripts = state
        .call_service
        .get_transcripts(&uuid)
        .await
        .map_err(|e| (axum::http::StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let responses: Vec<TranscriptResponse> = transcripts
        .into_iter()
        .map(TranscriptResponse::from_domain)
        .collect();

    Ok(Json(responses))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/calls", get(list_calls))
        .route("/api/calls/stats", get(get_stats))
        .route("/api/calls/:uuid", get(get_call))
        .route("/api/calls/:uuid/transcripts", get(get_call_transcripts))
}
