//! Upload listing and store reset endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{MessageResponse, UploadsResponse};

/// GET /check-uploads - List PDFs in the upload directory
pub async fn check_uploads(State(state): State<AppState>) -> Result<Response> {
    let files = state.uploads().list_pdfs().await?;

    if files.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(MessageResponse::new("No PDFs found")),
        )
            .into_response());
    }

    Ok(Json(UploadsResponse { files }).into_response())
}

/// POST /reset - Drop every chunk from the content store
pub async fn reset_store(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    let _guard = state.lock_index().await;
    state.store().reset().await?;

    tracing::info!("Content store reset on request");
    Ok(Json(MessageResponse::new("Content store cleared successfully!")))
}
