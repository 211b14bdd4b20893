//! REST API endpoints.
//!
//! Axum-based HTTP API serving ranked stage win rates as JSON.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod routes;
pub mod state;

use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream data source failed: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// CORS layer for the configured origin ("*" allows any).
fn cors_layer(origin: &str) -> Result<CorsLayer, ApiError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| ApiError::Internal(format!("Invalid CORS origin {}: {}", origin, e)))?;
    Ok(layer.allow_origin(origin))
}

/// Build the application router.
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router, ApiError> {
    Ok(Router::new()
        .route("/api/health", get(routes::health::health))
        .route(
            "/api/characters/:character_id/stages",
            get(routes::stages::character_stages),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin)?)
        .with_state(state))
}
