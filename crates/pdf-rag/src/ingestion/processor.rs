//! Ingestion pipeline orchestration

use std::path::Path;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::providers::{ContentStore, EmbeddingProvider};
use crate::types::Chunk;

use super::chunker::{RecursiveCharacterSplitter, TextSplitter};
use super::identity::ChunkIdentifier;
use super::loader::{DocumentSource, PdfLoader};
use super::sync::{sync_chunks, SyncReport};

/// Main ingestion pipeline: load, split, identify, sync
pub struct IngestPipeline {
    /// Page loader
    loader: Arc<dyn DocumentSource>,
    /// Text splitter
    splitter: Arc<dyn TextSplitter>,
    /// Identity assignment
    identifier: ChunkIdentifier,
}

impl IngestPipeline {
    /// Create a pipeline from its stages
    pub fn new(
        loader: Arc<dyn DocumentSource>,
        splitter: Arc<dyn TextSplitter>,
        identifier: ChunkIdentifier,
    ) -> Self {
        Self {
            loader,
            splitter,
            identifier,
        }
    }

    /// Create the PDF pipeline described by the configuration
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let splitter = RecursiveCharacterSplitter::new(
            config.chunking.chunk_size,
            config.chunking.chunk_overlap,
        )?;

        Ok(Self::new(
            Arc::new(PdfLoader::new(config.ingest.source_mode)),
            Arc::new(splitter),
            ChunkIdentifier::from_config(&config.identity),
        ))
    }

    /// Load and split a file, then assign identities
    pub async fn prepare(&self, path: &Path) -> Result<Vec<Chunk>> {
        let pages = self.loader.load(path).await?;
        let mut chunks = self.splitter.split_documents(&pages)?;
        self.identifier.assign(&mut chunks)?;

        tracing::info!(
            "Prepared {} chunks from {} pages of {} ({} loader)",
            chunks.len(),
            pages.len(),
            path.display(),
            self.loader.name()
        );

        Ok(chunks)
    }

    /// Full ingestion of one file into `store`
    pub async fn run(
        &self,
        path: &Path,
        store: &dyn ContentStore,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<SyncReport> {
        let chunks = self.prepare(path).await?;
        sync_chunks(store, embedder, &chunks).await
    }
}

impl Default for IngestPipeline {
    fn default() -> Self {
        Self::new(
            Arc::new(PdfLoader::default()),
            Arc::new(RecursiveCharacterSplitter::default()),
            ChunkIdentifier::default(),
        )
    }
}
