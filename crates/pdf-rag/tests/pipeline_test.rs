//! End-to-end ingestion and query flow with in-process collaborators

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pdf_rag::config::IdStrategy;
use pdf_rag::ingestion::{ChunkIdentifier, DocumentSource, IngestPipeline, TextSplitter};
use pdf_rag::providers::{ContentStore, EmbeddingProvider, LlmProvider, MemoryStore};
use pdf_rag::retrieval::QueryEngine;
use pdf_rag::storage::SqliteStore;
use pdf_rag::{Error, PageDocument, Result};

/// Yields the configured pages for any path, tagged with the file name
struct FixedPages {
    pages: Vec<(u32, &'static str)>,
}

#[async_trait]
impl DocumentSource for FixedPages {
    async fn load(&self, path: &Path) -> Result<Vec<PageDocument>> {
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(self
            .pages
            .iter()
            .map(|(page, text)| PageDocument::new(source.clone(), *page, *text))
            .collect())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Splits on `|`
struct PipeSplitter;

impl TextSplitter for PipeSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        text.split('|').map(str::to_string).collect()
    }
}

#[derive(Default)]
struct LengthEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingProvider for LengthEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![text.len() as f32, 1.0])
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "length"
    }
}

struct CannedLlm;

#[async_trait]
impl LlmProvider for CannedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(if prompt.contains("alpha") {
            "found alpha".to_string()
        } else {
            "no context".to_string()
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "canned"
    }
}

fn pipeline(pages: Vec<(u32, &'static str)>, identifier: ChunkIdentifier) -> IngestPipeline {
    IngestPipeline::new(
        Arc::new(FixedPages { pages }),
        Arc::new(PipeSplitter),
        identifier,
    )
}

fn two_page_pipeline() -> IngestPipeline {
    pipeline(
        vec![(0, "alpha|beta|gamma"), (1, "delta|epsilon")],
        ChunkIdentifier::default(),
    )
}

#[tokio::test]
async fn test_two_page_document_gets_page_scoped_ids() {
    let store = MemoryStore::new();
    let embedder = LengthEmbedder::default();

    let report = two_page_pipeline()
        .run(Path::new("/tmp/uploads/f.pdf"), &store, &embedder)
        .await
        .unwrap();

    let ids: Vec<String> = report.inserted.iter().map(ToString::to_string).collect();
    assert_eq!(
        ids,
        vec!["f.pdf:0:0", "f.pdf:0:1", "f.pdf:0:2", "f.pdf:1:0", "f.pdf:1:1"]
    );
    assert_eq!(report.total, 5);
    assert_eq!(report.existing, 0);
    assert_eq!(store.len().await.unwrap(), 5);
    assert_eq!(store.insert_calls(), 1);
    assert_eq!(store.persist_calls(), 1);
}

#[tokio::test]
async fn test_reindexing_same_document_adds_nothing() {
    let store = MemoryStore::new();
    let embedder = LengthEmbedder::default();
    let pipeline = two_page_pipeline();
    let path = Path::new("f.pdf");

    pipeline.run(path, &store, &embedder).await.unwrap();
    let second = pipeline.run(path, &store, &embedder).await.unwrap();

    assert_eq!(second.existing, 5);
    assert!(second.inserted.is_empty());
    assert_eq!(store.len().await.unwrap(), 5);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
    assert_eq!(store.persist_calls(), 1);
}

#[tokio::test]
async fn test_interleaved_pages_fail_loudly_by_default() {
    let store = MemoryStore::new();
    let embedder = LengthEmbedder::default();
    let pipeline = pipeline(
        vec![(0, "a|b"), (1, "c"), (0, "d")],
        ChunkIdentifier::default(),
    );

    let err = pipeline
        .run(Path::new("f.pdf"), &store, &embedder)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NonContiguousPage { ref page_id } if page_id == "f.pdf:0"));
    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_interleaved_pages_with_unchecked_sequential_ids_lose_chunks() {
    let store = MemoryStore::new();
    let embedder = LengthEmbedder::default();
    let pipeline = pipeline(
        vec![(0, "a|b"), (1, "c"), (0, "d")],
        ChunkIdentifier::new(IdStrategy::Sequential, false),
    );

    let chunks = pipeline.prepare(Path::new("f.pdf")).await.unwrap();
    let ids: Vec<String> = chunks
        .iter()
        .filter_map(|c| c.id().map(ToString::to_string))
        .collect();
    assert_eq!(ids, vec!["f.pdf:0:0", "f.pdf:0:1", "f.pdf:1:0", "f.pdf:0:0"]);

    // The repeated id inside one batch is rejected by the store
    let result = pipeline.run(Path::new("f.pdf"), &store, &embedder).await;
    assert!(matches!(result, Err(Error::Store(_))));
}

#[tokio::test]
async fn test_interleaved_pages_with_per_page_ids() {
    let store = MemoryStore::new();
    let embedder = LengthEmbedder::default();
    let pipeline = pipeline(
        vec![(0, "a|b"), (1, "c"), (0, "d")],
        ChunkIdentifier::new(IdStrategy::PerPage, true),
    );

    let report = pipeline
        .run(Path::new("f.pdf"), &store, &embedder)
        .await
        .unwrap();

    let ids: Vec<String> = report.inserted.iter().map(ToString::to_string).collect();
    assert_eq!(ids, vec!["f.pdf:0:0", "f.pdf:0:1", "f.pdf:1:0", "f.pdf:0:2"]);
    assert_eq!(store.len().await.unwrap(), 4);
}

#[tokio::test]
async fn test_index_then_query_against_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(dir.path()).unwrap();
    let embedder = LengthEmbedder::default();

    two_page_pipeline()
        .run(Path::new("f.pdf"), &store, &embedder)
        .await
        .unwrap();

    // "alpha", "gamma" and "delta" tie with the query; ties keep insertion order
    let answer = QueryEngine::new(2)
        .answer("abcde", &store, &embedder, &CannedLlm)
        .await
        .unwrap();

    assert_eq!(answer.response, "found alpha");
    assert_eq!(answer.sources.len(), 2);
    for source in &answer.sources {
        assert!(source.starts_with("f.pdf:"));
    }
}

#[test]
fn test_reset_then_reopen_is_empty() {
    let dir = tempfile::tempdir().unwrap();

    tokio_test::block_on(async {
        let store = SqliteStore::open(dir.path()).unwrap();
        let embedder = LengthEmbedder::default();
        two_page_pipeline()
            .run(Path::new("f.pdf"), &store, &embedder)
            .await
            .unwrap();
        store.reset().await.unwrap();
    });

    let reopened = SqliteStore::open(dir.path()).unwrap();
    assert_eq!(reopened.count().unwrap(), 0);
}
