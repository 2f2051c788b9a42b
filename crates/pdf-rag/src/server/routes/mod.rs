//! HTTP routes for the RAG server

pub mod documents;
pub mod ingest;
pub mod query;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route("/check-uploads", get(documents::check_uploads))
        // Upload - with larger body limit for file uploads
        .route(
            "/upload",
            post(ingest::upload_file).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query_rag))
        .route("/reset", post(documents::reset_store))
        .route("/reset_chroma", post(documents::reset_store))
}
