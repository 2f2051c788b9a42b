//! Application state for the RAG server

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::{RagConfig, StoreBackend};
use crate::error::Result;
use crate::ingestion::IngestPipeline;
use crate::providers::{ContentStore, EmbeddingProvider, LlmProvider, MemoryStore, OllamaProvider};
use crate::retrieval::QueryEngine;
use crate::storage::{SqliteStore, UploadArea};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Content store for chunks
    store: Arc<dyn ContentStore>,
    /// Embedding provider
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider
    llm: Arc<dyn LlmProvider>,
    /// Upload directory
    uploads: UploadArea,
    /// Load, split, identify, sync
    pipeline: IngestPipeline,
    /// Query flow
    query_engine: QueryEngine,
    /// Serializes upload and reset
    index_lock: Mutex<()>,
}

/// Open the content store selected by the configuration
pub fn open_store(config: &RagConfig) -> Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match config.store.backend {
        StoreBackend::Sqlite => {
            let store = SqliteStore::open(&config.store.path)?;
            tracing::info!("SQLite content store at {}", config.store.path.display());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory content store; indexed chunks are lost on exit");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

impl AppState {
    /// Create application state from configuration
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing RAG application state...");

        let store = open_store(&config)?;

        let (embedder, llm) = OllamaProvider::new(&config.llm)?.split();
        tracing::info!(
            "Ollama providers initialized at {} (embed: {}, generate: {})",
            config.llm.base_url,
            config.llm.embed_model,
            config.llm.generate_model
        );

        let uploads = UploadArea::open(&config.uploads.dir).await?;
        tracing::info!("Upload directory: {}", uploads.dir().display());

        let pipeline = IngestPipeline::from_config(&config)?;

        Ok(Self::from_parts(
            config,
            store,
            Arc::new(embedder),
            Arc::new(llm),
            uploads,
            pipeline,
        ))
    }

    /// Assemble state from already constructed collaborators
    pub fn from_parts(
        config: RagConfig,
        store: Arc<dyn ContentStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        uploads: UploadArea,
        pipeline: IngestPipeline,
    ) -> Self {
        let query_engine = QueryEngine::from_config(&config.retrieval);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                embedder,
                llm,
                uploads,
                pipeline,
                query_engine,
                index_lock: Mutex::new(()),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the content store
    pub fn store(&self) -> &dyn ContentStore {
        self.inner.store.as_ref()
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> &dyn EmbeddingProvider {
        self.inner.embedder.as_ref()
    }

    /// Get the LLM provider
    pub fn llm(&self) -> &dyn LlmProvider {
        self.inner.llm.as_ref()
    }

    /// Get the upload directory
    pub fn uploads(&self) -> &UploadArea {
        &self.inner.uploads
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &IngestPipeline {
        &self.inner.pipeline
    }

    /// Get the query engine
    pub fn query_engine(&self) -> &QueryEngine {
        &self.inner.query_engine
    }

    /// Wait for exclusive access to the store for upload or reset
    pub async fn lock_index(&self) -> MutexGuard<'_, ()> {
        self.inner.index_lock.lock().await
    }
}
