//! Deterministic chunk identities
//!
//! Every chunk gets `<source>:<page>:<index>`. The sequential strategy walks
//! chunks in order and restarts the index whenever the page changes between
//! neighbours, so it only yields unique ids when each page's chunks are
//! contiguous. The per-page strategy counts per `(source, page)` instead.

use std::collections::{HashMap, HashSet};

use crate::config::{IdStrategy, IdentityConfig};
use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId};

/// Assign ids by scanning in order, resetting the index on every page change
pub fn assign_sequential(chunks: &mut [Chunk]) {
    let mut last_page: Option<String> = None;
    let mut index = 0u32;

    for chunk in chunks.iter_mut() {
        let page_id = chunk.page_id();
        if last_page.as_deref() == Some(page_id.as_str()) {
            index += 1;
        } else {
            index = 0;
        }

        chunk.metadata.id = Some(ChunkId::new(
            chunk.metadata.source.clone(),
            chunk.metadata.page,
            index,
        ));
        last_page = Some(page_id);
    }
}

/// Assign ids with a separate counter for every page
pub fn assign_per_page(chunks: &mut [Chunk]) {
    let mut counters: HashMap<String, u32> = HashMap::new();

    for chunk in chunks.iter_mut() {
        let counter = counters.entry(chunk.page_id()).or_insert(0);
        chunk.metadata.id = Some(ChunkId::new(
            chunk.metadata.source.clone(),
            chunk.metadata.page,
            *counter,
        ));
        *counter += 1;
    }
}

/// Fail if any page's chunks are split into more than one run
pub fn check_contiguity(chunks: &[Chunk]) -> Result<()> {
    let mut finished: HashSet<String> = HashSet::new();
    let mut current: Option<String> = None;

    for chunk in chunks {
        let page_id = chunk.page_id();
        if current.as_deref() == Some(page_id.as_str()) {
            continue;
        }
        if finished.contains(&page_id) {
            return Err(Error::NonContiguousPage { page_id });
        }
        if let Some(previous) = current.replace(page_id) {
            finished.insert(previous);
        }
    }

    Ok(())
}

/// Assigns identities according to the configured strategy
#[derive(Debug, Clone, Copy)]
pub struct ChunkIdentifier {
    strategy: IdStrategy,
    enforce_contiguity: bool,
}

impl ChunkIdentifier {
    /// Create an identifier
    pub fn new(strategy: IdStrategy, enforce_contiguity: bool) -> Self {
        Self {
            strategy,
            enforce_contiguity,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &IdentityConfig) -> Self {
        Self::new(config.strategy, config.enforce_contiguity)
    }

    /// Set `metadata.id` on every chunk, leaving all other fields untouched
    pub fn assign(&self, chunks: &mut [Chunk]) -> Result<()> {
        match self.strategy {
            IdStrategy::Sequential => {
                if self.enforce_contiguity {
                    check_contiguity(chunks)?;
                }
                assign_sequential(chunks);
            }
            IdStrategy::PerPage => assign_per_page(chunks),
        }
        Ok(())
    }
}

impl Default for ChunkIdentifier {
    fn default() -> Self {
        Self::from_config(&IdentityConfig::default())
    }
}
