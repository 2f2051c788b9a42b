//! Error types for the RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
#[derive(Debug, Error)]
pub enum Error {
    /// Request was missing something or carried a bad value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Uploaded file is not a PDF
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document could not be loaded into pages
    #[error("Failed to load document '{source_id}': {message}")]
    DocumentLoad { source_id: String, message: String },

    /// Page text could not be split into chunks
    #[error("Failed to split document: {0}")]
    Split(String),

    /// A page's chunks were interleaved with another page's chunks
    #[error("Chunks of page '{page_id}' are not contiguous")]
    NonContiguousPage { page_id: String },

    /// Chunk reached the store without an identity
    #[error("Chunk at position {0} has no identity")]
    MissingChunkId(usize),

    /// Content store error
    #[error("Content store error: {0}")]
    Store(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Ollama/LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a document load error
    pub fn document_load(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DocumentLoad {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the caller sent something we refuse to process
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::UnsupportedFileType(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Store(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg.clone()),
            Error::UnsupportedFileType(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", ext),
            ),
            Error::Embedding(_) | Error::Llm(_) => {
                tracing::error!("Backend failure: {}", self);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "backend_error",
                    self.to_string(),
                )
            }
            _ => {
                tracing::error!("Processing failure: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "processing_error",
                    "Failed to process the request".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        let response = Error::invalid_input("No query text provided").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = Error::UnsupportedFileType("txt".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processing_errors_are_generic() {
        let err = Error::document_load("f.pdf", "broken xref");
        assert!(!err.is_client_error());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = Error::store("disk full");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_backend_errors_are_unavailable() {
        let err = Error::llm("model not found");
        assert!(!err.is_client_error());
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

        let err = Error::embedding("connection refused");
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
