//! Incremental sync of identified chunks into a content store

use serde::Serialize;

use crate::error::{Error, Result};
use crate::providers::{ContentStore, EmbeddingProvider};
use crate::types::{Chunk, ChunkId, StoredChunk};

/// Outcome of one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Chunks offered to the store
    pub total: usize,
    /// Chunks skipped because their id was already stored
    pub existing: usize,
    /// Ids written in this run, in input order
    pub inserted: Vec<ChunkId>,
}

/// Insert the chunks whose identity is not yet in `store`
///
/// Existing ids are fetched once. New chunks are embedded with one batch
/// call, inserted as one batch and persisted; when nothing is new the store
/// and the embedder are not touched again.
pub async fn sync_chunks(
    store: &dyn ContentStore,
    embedder: &dyn EmbeddingProvider,
    chunks: &[Chunk],
) -> Result<SyncReport> {
    let existing_ids = store.existing_ids().await?;

    let mut new_chunks = Vec::new();
    for (position, chunk) in chunks.iter().enumerate() {
        let id = chunk.id().ok_or(Error::MissingChunkId(position))?;
        if !existing_ids.contains(id) {
            new_chunks.push((id.clone(), chunk));
        }
    }

    let existing = chunks.len() - new_chunks.len();
    tracing::info!(
        "Number of existing chunks in store: {}, new: {}",
        existing,
        new_chunks.len()
    );

    if new_chunks.is_empty() {
        return Ok(SyncReport {
            total: chunks.len(),
            existing,
            inserted: Vec::new(),
        });
    }

    let texts: Vec<String> = new_chunks
        .iter()
        .map(|(_, chunk)| chunk.content.clone())
        .collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != new_chunks.len() {
        return Err(Error::embedding(format!(
            "Expected {} embeddings from {}, got {}",
            new_chunks.len(),
            embedder.name(),
            embeddings.len()
        )));
    }

    let inserted: Vec<ChunkId> = new_chunks.iter().map(|(id, _)| id.clone()).collect();
    let records = new_chunks
        .into_iter()
        .zip(embeddings)
        .map(|((id, chunk), embedding)| StoredChunk {
            id,
            content: chunk.content.clone(),
            embedding,
        })
        .collect();

    store.insert(records).await?;
    store.persist().await?;

    tracing::info!("Added {} new chunks to {}", inserted.len(), store.name());

    Ok(SyncReport {
        total: chunks.len(),
        existing,
        inserted,
    })
}
