//! Upload endpoint: replace the current PDF and re-index it

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::storage::{content_hash, is_allowed};
use crate::types::UploadResponse;

/// Multipart field carrying the document
const FILE_FIELD: &str = "file";

/// POST /upload - Save the PDF, reset the store and index the new document
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::invalid_input(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| Error::invalid_input(format!("Failed to read file: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = match upload {
        Some((filename, data)) if is_allowed(&filename) => (filename, data),
        _ => {
            return Err(Error::invalid_input(
                "No file uploaded or invalid file format",
            ))
        }
    };

    tracing::info!("Processing upload: {} ({} bytes)", filename, data.len());

    let _guard = state.lock_index().await;

    let path = state.uploads().replace(&filename, &data).await?;
    state.store().reset().await?;

    let report = state
        .pipeline()
        .run(&path, state.store(), state.embedder())
        .await?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        "Indexed {}: {} chunks, {} inserted in {}ms",
        path.display(),
        report.total,
        report.inserted.len(),
        processing_time_ms
    );

    Ok(Json(UploadResponse::processed(
        path.display().to_string(),
        content_hash(&data),
        &report,
        processing_time_ms,
    )))
}
