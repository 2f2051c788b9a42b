//! Content store trait for chunks, their embeddings and similarity search

use async_trait::async_trait;
use std::collections::HashSet;

use crate::error::Result;
use crate::types::{ChunkId, ScoredChunk, StoredChunk};

/// Trait for persistent chunk storage keyed by chunk identity
///
/// Implementations:
/// - `SqliteStore`: On-disk SQLite database
/// - `MemoryStore`: Process-local map, used by tests and `backend = "memory"`
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every identity currently stored
    async fn existing_ids(&self) -> Result<HashSet<ChunkId>>;

    /// Insert a batch of records; an id already stored (or repeated in the batch) is a store error
    async fn insert(&self, chunks: Vec<StoredChunk>) -> Result<()>;

    /// Make previous inserts durable
    async fn persist(&self) -> Result<()>;

    /// Top `k` records by cosine similarity, best first
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>>;

    /// Number of stored records
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Remove every record
    async fn reset(&self) -> Result<()>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Sort candidates by similarity and keep the best `k`
pub(crate) fn top_k(mut scored: Vec<ScoredChunk>, k: usize) -> Vec<ScoredChunk> {
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);
    scored
}
