use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use super::documents;
use super::health;
use super::state::AppState;

/// Create the router with application state.
///
/// `max_upload_bytes` bounds every request body, uploads included.
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/status", get(health::pipeline_status))
        .route("/upload-document/", post(documents::upload_document))
        .route("/chat/", post(documents::chat))
        .route("/reset-chatbot/", post(documents::reset_chatbot))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
