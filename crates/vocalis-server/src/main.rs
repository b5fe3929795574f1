use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod auth;
mod models;
mod routes;

use adapters::{PgCallRepository, PgTranscriptRepository};
use application::{CallService, StatsService};

/// Type aliases for application services with concrete repository implementations
pub type AppCallService = CallService<PgCallRepository, PgTranscriptRepository>;
pub type AppStatsService = StatsService<PgCallRepository>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub call_service: Arc<AppCallService>,
    pub stats_service: Arc<AppStatsService>,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Vocalis API is running - call events flow downstream".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("📞 Vocalis API initializing...");

    // Initialize webhook shared secret from secrets
    if let Some(secret) = secrets.get("WEBHOOK_SECRET") {
        auth::init_shared_secret(secret);
        tracing::info!("🔐 Webhook shared-secret authentication enabled");
    } else {
        tracing::warn!("⚠️  No WEBHOOK_SECRET set - authentication disabled");
    }

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("✅ Database migrations completed");

    // Initialize application services
    let call_repo = Arc::new(PgCallRepository::new(pool.clone()));
    let transcript_repo = Arc::new(PgTranscriptRepository::new(pool.clone()));
    let call_service = Arc::new(CallService::new(call_repo.clone(), transcript_repo));
    let stats_service = Arc::new(StatsService::new(call_repo));

    // Create application state
    let state = AppState {
        call_service,
        stats_service,
    };

    // Protected routes (require the shared secret)
    let protected_routes = Router::new()
        .merge(routes::webhook::router())
        .merge(routes::call::router())
        .layer(middleware::from_fn(auth::auth_middleware));

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    // Build router with shared state
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Vocalis API ready - webhook at /api/calls/webhook");

    Ok(router.into())
}
