//! Shared-Secret Authentication (Bearer Token)

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};

/// Webhook shared secret from secrets store
static SHARED_SECRET: std::sync::OnceLock<String> = std::sync::OnceLock::new();

/// Initialize the shared secret
pub fn init_shared_secret(secret: String) {
    let _ = SHARED_SECRET.set(secret);
}

/// Get the shared secret
fn get_shared_secret() -> Option<&'static str> {
    SHARED_SECRET.get().map(|s| s.as_str())
}

/// Authentication middleware
/// Validates Bearer token against the shared secret
pub async fn auth_middleware(request: Request, next: Next) -> Result<Response, StatusCode> {
    // Get shared secret
    let secret = match get_shared_secret() {
        Some(secret) if !secret.is_empty() => secret,
        _ => {
            // No secret configured = auth disabled (for development)
            tracing::warn!("No shared secret configured, authentication disabled");
            return Ok(next.run(request).await);
        }
    };

    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = &header[7..]; // Remove "Bearer " prefix
            if token == secret {
                Ok(next.run(request).await)
            } else {
                tracing::warn!("Invalid shared secret attempted");
                Err(StatusCode::UNAUTHORIZED)
            }
        }
        Some(_) => {
            tracing::warn!("Invalid Authorization header format");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
