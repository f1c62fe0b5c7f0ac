//! signfield API server
//!
//! Provides REST endpoints for:
//! - Edit sessions and page viewport reporting
//! - Field placement, dragging, resizing and content
//! - Finalization through a local or remote rendering backend
//! - Signed document delivery

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod state;

pub use config::Config;
pub use state::AppState;

/// Upload limit; base64 PDFs are a third larger than the file
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration for web clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Sessions
        .route("/api/documents", post(handlers::create_document))
        .route("/api/documents/:id", get(handlers::get_document))
        .route(
            "/api/documents/:id/pages/:page/viewport",
            put(handlers::report_viewport),
        )
        // Fields
        .route("/api/documents/:id/fields", post(handlers::place_field))
        .route(
            "/api/documents/:id/fields/:field_id",
            delete(handlers::remove_field),
        )
        .route(
            "/api/documents/:id/fields/:field_id/position",
            patch(handlers::move_field),
        )
        .route(
            "/api/documents/:id/fields/:field_id/size",
            patch(handlers::resize_field),
        )
        .route(
            "/api/documents/:id/fields/:field_id/content",
            patch(handlers::set_content),
        )
        .route(
            "/api/documents/:id/fields/:field_id/font",
            patch(handlers::set_font),
        )
        // Finalization
        .route("/api/documents/:id/finalize", post(handlers::finalize))
        .route("/api/documents/:id/signed", get(handlers::get_signed))
        .route("/api/render", post(handlers::render))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
