//! WebAPI - Relay HTTP Endpoints
//!
//! ## Responsibilities
//!
//! - HTTP API routes
//! - Request method and body validation
//! - Response formatting

mod routes;

pub use routes::create_router;

use axum::response::IntoResponse;
use axum::Json;

use crate::models::HealthResponse;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
