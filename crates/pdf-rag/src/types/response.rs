//! Response types for the HTTP API

use serde::{Deserialize, Serialize};

use crate::ingestion::SyncReport;

/// Answer produced by the query engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Raw text returned by the model
    pub response: String,
    /// Identities of the chunks used as context, in rank order
    pub sources: Vec<String>,
}

impl QueryResponse {
    /// Create a new query response
    pub fn new(response: String, sources: Vec<String>) -> Self {
        Self { response, sources }
    }
}

/// Response from an upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Human readable status
    pub message: String,
    /// Where the upload was saved
    pub file_path: String,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    /// Chunks produced from the document
    pub chunks_total: usize,
    /// Chunks newly written to the store
    pub chunks_inserted: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl UploadResponse {
    /// Build the response for a processed upload
    pub fn processed(
        file_path: String,
        content_hash: String,
        report: &SyncReport,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            message: "File uploaded and processed successfully".to_string(),
            file_path,
            content_hash,
            chunks_total: report.total,
            chunks_inserted: report.inserted.len(),
            processing_time_ms,
        }
    }
}

/// Listing of the uploads directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsResponse {
    /// PDF files currently stored
    pub files: Vec<String>,
}

/// Plain status message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human readable status
    pub message: String,
}

impl MessageResponse {
    /// Create a message response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
