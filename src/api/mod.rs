//! REST API endpoints.
//!
//! Axum-based HTTP API for league leaderboards, rankings and general
//! league statistics.

pub mod routes;
pub mod state;

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

use crate::service::StatsError;
use state::AppState;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        match err {
            StatsError::InvalidLeagueId(_)
            | StatsError::InvalidYear(_)
            | StatsError::UnsupportedStatType(_)
            | StatsError::MissingStatType => ApiError::BadRequest(err.to_string()),
            StatsError::LeagueNotFound(_) => ApiError::NotFound(err.to_string()),
            StatsError::Storage(e) => {
                tracing::error!(error = %e, "Ledger read failed");
                ApiError::Internal(e.to_string())
            }
        }
    }
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
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
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

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        return layer.allow_origin(Any);
    }
    match origin.parse::<HeaderValue>() {
        Ok(value) => layer.allow_origin(value),
        Err(_) => {
            tracing::warn!(origin, "Invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origin);

    Router::new()
        .route("/health", get(routes::health))
        .route("/api/leagues/:league_id/stats", get(routes::stats::league_stats))
        .route(
            "/api/leagues/:league_id/stats/rankings",
            get(routes::stats::league_rankings),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
