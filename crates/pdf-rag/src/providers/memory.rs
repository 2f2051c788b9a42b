//! In-memory content store
//!
//! Keeps every record in a map and searches by brute-force cosine similarity.
//! Nothing survives the process, so `persist` only counts calls. Used by tests
//! and when the store backend is configured as `memory`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::retrieval::cosine_similarity;
use crate::types::{ChunkId, ScoredChunk, StoredChunk};

use super::content_store::{top_k, ContentStore};

/// In-memory content store
#[derive(Default)]
pub struct MemoryStore {
    chunks: RwLock<BTreeMap<ChunkId, StoredChunk>>,
    insert_calls: AtomicUsize,
    persist_calls: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `insert` batches received
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Number of `persist` calls received
    pub fn persist_calls(&self) -> usize {
        self.persist_calls.load(Ordering::SeqCst)
    }

    /// Fetch a record by identity
    pub async fn get(&self, id: &ChunkId) -> Option<StoredChunk> {
        self.chunks.read().await.get(id).cloned()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn existing_ids(&self) -> Result<HashSet<ChunkId>> {
        Ok(self.chunks.read().await.keys().cloned().collect())
    }

    async fn insert(&self, chunks: Vec<StoredChunk>) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let mut store = self.chunks.write().await;

        let mut batch_ids = HashSet::new();
        for chunk in &chunks {
            if store.contains_key(&chunk.id) || !batch_ids.insert(&chunk.id) {
                return Err(Error::Store(format!("Chunk {} already exists", chunk.id)));
            }
        }

        let count = chunks.len();
        for chunk in chunks {
            store.insert(chunk.id.clone(), chunk);
        }
        debug!("Inserted {} chunks into memory store", count);
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        self.persist_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let chunks = self.chunks.read().await;
        let scored = chunks
            .values()
            .map(|chunk| ScoredChunk {
                similarity: cosine_similarity(query_embedding, &chunk.embedding),
                chunk: chunk.clone(),
            })
            .collect();
        Ok(top_k(scored, k))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.chunks.read().await.len())
    }

    async fn reset(&self) -> Result<()> {
        self.chunks.write().await.clear();
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u32, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            id: ChunkId::new("f.pdf", 0, index),
            content: format!("chunk {}", index),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_insert_and_existing_ids() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await.unwrap());

        store
            .insert(vec![record(0, vec![1.0, 0.0]), record(1, vec![0.0, 1.0])])
            .await
            .unwrap();

        let ids = store.existing_ids().await.unwrap();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&ChunkId::new("f.pdf", 0, 1)));
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = MemoryStore::new();
        store
            .insert(vec![
                record(0, vec![0.0, 1.0]),
                record(1, vec![1.0, 0.0]),
                record(2, vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.id.to_string(), "f.pdf:0:1");
        assert_eq!(results[1].chunk.id.to_string(), "f.pdf:0:2");
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[tokio::test]
    async fn test_duplicate_ids_are_rejected() {
        let store = MemoryStore::new();
        store.insert(vec![record(0, vec![1.0])]).await.unwrap();

        assert!(store.insert(vec![record(0, vec![2.0])]).await.is_err());
        assert!(store
            .insert(vec![record(1, vec![1.0]), record(1, vec![1.0])])
            .await
            .is_err());
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reset_empties_store() {
        let store = MemoryStore::new();
        store.insert(vec![record(0, vec![1.0])]).await.unwrap();
        store.reset().await.unwrap();

        assert_eq!(store.len().await.unwrap(), 0);
        assert!(store.search(&[1.0], 5).await.unwrap().is_empty());
    }
}
