//! SQLite content store
//!
//! One row per chunk keyed by its `<source>:<page>:<index>` identity, with the
//! embedding stored as a little-endian `f32` blob. Search is a brute-force
//! cosine scan over every row.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::content_store::{top_k, ContentStore};
use crate::retrieval::cosine_similarity;
use crate::types::{ChunkId, ScoredChunk, StoredChunk};

/// File name of the database inside the store directory
pub const DB_FILE_NAME: &str = "chunks.sqlite3";

/// SQLite-based content store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Create or open the store inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            Error::Store(format!("Failed to create store directory {}: {}", dir.display(), e))
        })?;

        let path = dir.join(DB_FILE_NAME);
        let conn = Connection::open(&path)
            .map_err(|e| Error::Store(format!("Failed to open database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path),
        };

        store.migrate()?;
        Ok(store)
    }

    /// Create an in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Store(format!("Failed to open in-memory database: {}", e)))?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        };

        store.migrate()?;
        Ok(store)
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run database migrations
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA temp_store=MEMORY;
        "#,
        )
        .map_err(|e| Error::Store(format!("Failed to set pragmas: {}", e)))?;

        create_schema(&conn)
    }

    /// Every stored identity
    pub fn ids(&self) -> Result<HashSet<ChunkId>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT id FROM chunks")
            .map_err(|e| Error::Store(format!("Failed to prepare query: {}", e)))?;

        let raw: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::Store(format!("Failed to query chunk ids: {}", e)))?
            .collect::<rusqlite::Result<_>>()?;

        raw.iter().map(|id| parse_id(id)).collect()
    }

    /// Insert a batch in one transaction; an id already present aborts the whole batch
    pub fn insert_batch(&self, chunks: &[StoredChunk]) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Store(format!("Failed to begin transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    r#"
                INSERT INTO chunks (id, source, page, content, embedding, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                )
                .map_err(|e| Error::Store(format!("Failed to prepare statement: {}", e)))?;

            let now = Utc::now().to_rfc3339();
            for chunk in chunks {
                stmt.execute(params![
                    chunk.id.to_string(),
                    chunk.source(),
                    chunk.page() as i64,
                    chunk.content,
                    encode_embedding(&chunk.embedding),
                    &now,
                ])
                .map_err(|e| Error::Store(format!("Failed to insert chunk {}: {}", chunk.id, e)))?;
            }
        }

        tx.commit()
            .map_err(|e| Error::Store(format!("Failed to commit transaction: {}", e)))?;

        Ok(())
    }

    /// Fold the write-ahead log into the main database file
    pub fn checkpoint(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(|e| Error::Store(format!("Failed to checkpoint database: {}", e)))
    }

    /// Load every record
    pub fn all(&self) -> Result<Vec<StoredChunk>> {
        let conn = self.conn.lock();

        let mut stmt = conn
            .prepare("SELECT id, content, embedding FROM chunks ORDER BY rowid")
            .map_err(|e| Error::Store(format!("Failed to prepare query: {}", e)))?;

        let rows: Vec<(String, String, Vec<u8>)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .map_err(|e| Error::Store(format!("Failed to query chunks: {}", e)))?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter()
            .map(|(id, content, blob)| {
                Ok(StoredChunk {
                    id: parse_id(&id)?,
                    content,
                    embedding: decode_embedding(&blob)?,
                })
            })
            .collect()
    }

    /// Number of rows
    pub fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| Error::Store(format!("Failed to count chunks: {}", e)))?;
        Ok(count as usize)
    }

    /// Drop and recreate the chunk table
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch("DROP TABLE IF EXISTS chunks;")
            .map_err(|e| Error::Store(format!("Failed to drop chunks: {}", e)))?;
        create_schema(&conn)?;
        tracing::info!("Content store cleared");
        Ok(())
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(SqliteStore) -> Result<T> + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || f(store))
            .await
            .map_err(|e| Error::internal(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn existing_ids(&self) -> Result<HashSet<ChunkId>> {
        self.blocking(|store| store.ids()).await
    }

    async fn insert(&self, chunks: Vec<StoredChunk>) -> Result<()> {
        self.blocking(move |store| store.insert_batch(&chunks)).await
    }

    async fn persist(&self) -> Result<()> {
        self.blocking(|store| store.checkpoint()).await
    }

    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        let query = query_embedding.to_vec();
        self.blocking(move |store| {
            let scored = store
                .all()?
                .into_iter()
                .map(|chunk| ScoredChunk {
                    similarity: cosine_similarity(&query, &chunk.embedding),
                    chunk,
                })
                .collect();
            Ok(top_k(scored, k))
        })
        .await
    }

    async fn len(&self) -> Result<usize> {
        self.blocking(|store| store.count()).await
    }

    async fn reset(&self) -> Result<()> {
        self.blocking(|store| store.clear()).await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL,
            page INTEGER NOT NULL,
            content TEXT NOT NULL,
            embedding BLOB NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
    "#,
    )
    .map_err(|e| Error::Store(format!("Failed to create schema: {}", e)))
}

fn parse_id(raw: &str) -> Result<ChunkId> {
    raw.parse()
        .map_err(|_| Error::Store(format!("Corrupt chunk id in store: {}", raw)))
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::Store(format!(
            "Embedding blob has invalid length {}",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(page: u32, index: u32, embedding: Vec<f32>) -> StoredChunk {
        StoredChunk {
            id: ChunkId::new("f.pdf", page, index),
            content: format!("page {} chunk {}", page, index),
            embedding,
        }
    }

    #[test]
    fn test_insert_and_read_back() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .insert_batch(&[record(0, 0, vec![0.5, -1.25]), record(0, 1, vec![1.0, 0.0])])
            .unwrap();

        assert_eq!(store.count().unwrap(), 2);
        let ids = store.ids().unwrap();
        assert!(ids.contains(&ChunkId::new("f.pdf", 0, 0)));

        let mut all = store.all().unwrap();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(all[0].embedding, vec![0.5, -1.25]);
        assert_eq!(all[1].content, "page 0 chunk 1");
    }

    #[test]
    fn test_duplicate_id_aborts_batch() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_batch(&[record(0, 0, vec![1.0])]).unwrap();

        let err = store
            .insert_batch(&[record(0, 1, vec![1.0]), record(0, 0, vec![2.0])])
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));

        // Rolled back: the first record of the failed batch is absent too
        assert_eq!(store.count().unwrap(), 1);
        assert!(!store.ids().unwrap().contains(&ChunkId::new("f.pdf", 0, 1)));
    }

    #[test]
    fn test_clear() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert_batch(&[record(0, 0, vec![1.0])]).unwrap();
        store.clear().unwrap();

        assert_eq!(store.count().unwrap(), 0);
        store.insert_batch(&[record(1, 0, vec![1.0])]).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_decode_rejects_truncated_blob() {
        assert!(decode_embedding(&[0, 0, 128]).is_err());
        assert_eq!(decode_embedding(&encode_embedding(&[3.5])).unwrap(), vec![3.5]);
    }

    #[tokio::test]
    async fn test_persisted_chunks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = SqliteStore::open(dir.path()).unwrap();
            store
                .insert(vec![record(0, 0, vec![1.0, 0.0]), record(1, 0, vec![0.0, 1.0])])
                .await
                .unwrap();
            store.persist().await.unwrap();
        }

        let reopened = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        assert!(dir.path().join(DB_FILE_NAME).exists());

        let results = reopened.search(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.id.to_string(), "f.pdf:1:0");
    }

    #[tokio::test]
    async fn test_reset_through_trait() {
        let store = SqliteStore::in_memory().unwrap();
        store.insert(vec![record(0, 0, vec![1.0])]).await.unwrap();
        store.reset().await.unwrap();

        assert!(store.is_empty().await.unwrap());
        assert!(store.existing_ids().await.unwrap().is_empty());
    }
}
