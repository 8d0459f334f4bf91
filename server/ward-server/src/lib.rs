//! Ward IV billing HTTP server
//!
//! REST API for nurses (intake, IV assignments) and billers (charges,
//! corrections, discharge), backed by `billing-service`.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod validation;

// Re-export commonly used types
pub use crate::config::WardConfig;
pub use error::*;
pub use server::WardServer;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: WardServer) -> Router {
    let cors = middleware::create_cors_layer(&server.config.server.cors_origins);

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
