//! Page documents, chunks and chunk identities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Text of a single page, as produced by a document source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Source identifier (file name or path)
    pub source: String,
    /// Page number (0-indexed)
    pub page: u32,
    /// Extracted page text
    pub content: String,
}

impl PageDocument {
    /// Create a page document
    pub fn new(source: impl Into<String>, page: u32, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            page,
            content: content.into(),
        }
    }
}

/// Deterministic chunk identity: `<source>:<page>:<index>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChunkId {
    source: String,
    page: u32,
    index: u32,
}

impl ChunkId {
    /// Create an identity from its parts
    pub fn new(source: impl Into<String>, page: u32, index: u32) -> Self {
        Self {
            source: source.into(),
            page,
            index,
        }
    }

    /// Source identifier
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Ordinal of the chunk within its page
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The `<source>:<page>` prefix shared by all chunks of a page
    pub fn page_id(&self) -> String {
        page_id(&self.source, self.page)
    }
}

/// Format the `<source>:<page>` key of a page
pub fn page_id(source: &str, page: u32) -> String {
    format!("{}:{}", source, page)
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.page, self.index)
    }
}

impl FromStr for ChunkId {
    type Err = Error;

    /// Splits on the last two `:` so sources may themselves contain `:`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::invalid_input(format!("Malformed chunk id: {}", s));

        let mut parts = s.rsplitn(3, ':');
        let index = parts.next().ok_or_else(invalid)?;
        let page = parts.next().ok_or_else(invalid)?;
        let source = parts.next().ok_or_else(invalid)?;

        Ok(Self {
            source: source.to_string(),
            page: page.parse().map_err(|_| invalid())?,
            index: index.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ChunkId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ChunkId> for String {
    fn from(id: ChunkId) -> Self {
        id.to_string()
    }
}

/// Metadata carried by a chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source identifier inherited from the page
    pub source: String,
    /// Page number inherited from the page
    pub page: u32,
    /// Identity, assigned after splitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ChunkId>,
}

/// A span of page text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content
    pub content: String,
    /// Source, page and identity
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a chunk without an identity
    pub fn new(source: impl Into<String>, page: u32, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: ChunkMetadata {
                source: source.into(),
                page,
                id: None,
            },
        }
    }

    /// The `<source>:<page>` key of this chunk's page
    pub fn page_id(&self) -> String {
        page_id(&self.metadata.source, self.metadata.page)
    }

    /// Assigned identity, if any
    pub fn id(&self) -> Option<&ChunkId> {
        self.metadata.id.as_ref()
    }
}

/// Record held by the content store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Identity (primary key)
    pub id: ChunkId,
    /// Text content
    pub content: String,
    /// Embedding vector
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embedding: Vec<f32>,
}

impl StoredChunk {
    /// Source identifier
    pub fn source(&self) -> &str {
        self.id.source()
    }

    /// Page number
    pub fn page(&self) -> u32 {
        self.id.page()
    }
}

/// Stored chunk with its similarity to a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    /// The matched chunk
    pub chunk: StoredChunk,
    /// Cosine similarity (higher is more similar)
    pub similarity: f32,
}
