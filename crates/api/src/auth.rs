//! `X-API-Key` authentication middleware: a byte-exact comparison against
//! `Server.APIKey`. An empty configured key disables the check
//! ("dashboard mode").

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

use crate::rest::ErrorResponse;
use recommend_core::AppConfig;

pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path.starts_with("/health") || path.starts_with("/ready") || path.starts_with("/live") {
        return next.run(req).await;
    }

    if config.server.api_key.is_empty() {
        return next.run(req).await;
    }

    let provided = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == config.server.api_key => next.run(req).await,
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "unauthorized".to_string(),
                message: "missing or invalid X-API-Key header".to_string(),
            }),
        )
            .into_response(),
    }
}
