//! pdf-rag: question answering over an uploaded PDF
//!
//! A PDF is split into page documents, chunked with overlapping windows and
//! given deterministic `<source>:<page>:<index>` identities. Only chunks whose
//! identity is new are embedded and written to the content store. Queries
//! embed the question, retrieve the closest chunks and ask an Ollama model to
//! answer from that context alone.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use types::{
    document::{Chunk, ChunkId, PageDocument, StoredChunk},
    query::QueryRequest,
    response::QueryResponse,
};
