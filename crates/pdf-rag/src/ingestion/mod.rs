//! Document ingestion pipeline: PDF pages to identified, synced chunks

mod chunker;
pub mod identity;
mod loader;
mod processor;
mod sync;

pub use chunker::{
    RecursiveCharacterSplitter, TextSplitter, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE,
    DEFAULT_SEPARATORS,
};
pub use identity::{assign_per_page, assign_sequential, check_contiguity, ChunkIdentifier};
pub use loader::{DocumentSource, PdfLoader};
#[cfg(test)]
pub(crate) use loader::sample_pdf;
pub use processor::IngestPipeline;
pub use sync::{sync_chunks, SyncReport};
