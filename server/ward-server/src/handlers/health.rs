use crate::server::WardServer;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status
    #[schema(example = "healthy")]
    pub status: String,
    /// Storage backend state: `connected`, `disconnected` or `in-memory`
    #[schema(example = "connected")]
    pub database: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2024-01-15T10:30:00Z")]
    pub timestamp: String,
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(State(server): State<WardServer>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = server.billing.is_healthy().await;
    let database = match (&server.db_pool, healthy) {
        (None, _) => "in-memory",
        (Some(_), true) => "connected",
        (Some(_), false) => "disconnected",
    };
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (status_code, Json(response))
}
