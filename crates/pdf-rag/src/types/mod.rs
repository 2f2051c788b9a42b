//! Core types for the RAG system

pub mod document;
pub mod query;
pub mod response;

pub use document::{page_id, Chunk, ChunkId, ChunkMetadata, PageDocument, ScoredChunk, StoredChunk};
pub use query::QueryRequest;
pub use response::{MessageResponse, QueryResponse, UploadResponse, UploadsResponse};
