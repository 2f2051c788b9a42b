//! Recursive character splitting with fixed window size and overlap

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::types::{Chunk, PageDocument};

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Default overlap in characters
pub const DEFAULT_CHUNK_OVERLAP: usize = 80;

/// Separators tried in order: paragraphs, lines, words, characters
pub const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Splits page documents into chunks
pub trait TextSplitter: Send + Sync {
    /// Split one text into ordered windows
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split every page, keeping all chunks of a page together and pages in order
    fn split_documents(&self, pages: &[PageDocument]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for page in pages {
            chunks.extend(
                self.split_text(&page.content)
                    .into_iter()
                    .map(|text| Chunk::new(page.source.clone(), page.page, text)),
            );
        }
        Ok(chunks)
    }
}

/// Splitter that tries coarse separators first and recurses into finer ones
/// for pieces that are still too long. Lengths are counted in characters.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        Self::with_separators(chunk_size, chunk_overlap, DEFAULT_SEPARATORS)
    }

    /// Create a splitter with custom separators
    pub fn with_separators(
        chunk_size: usize,
        chunk_overlap: usize,
        separators: &[&str],
    ) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Split("chunk size must be positive".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Split(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            separators: separators.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap in characters
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut final_chunks = Vec::new();

        // First separator present in the text; "" always matches
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut remaining: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = candidate.as_str();
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate.as_str();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut good_splits = Vec::new();
        for piece in split_keeping_separator(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
                continue;
            }

            if !good_splits.is_empty() {
                final_chunks.extend(self.merge_splits(&good_splits));
                good_splits.clear();
            }

            if remaining.is_empty() {
                if let Some(piece) = join_pieces(&[piece]) {
                    final_chunks.push(piece);
                }
            } else {
                final_chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good_splits.is_empty() {
            final_chunks.extend(self.merge_splits(&good_splits));
        }

        final_chunks
    }

    /// Greedily pack pieces into windows of at most `chunk_size`, carrying
    /// at most `chunk_overlap` characters into the next window
    fn merge_splits(&self, splits: &[String]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<&String> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size && !current.is_empty() {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of {} characters, longer than the limit {}",
                        total,
                        self.chunk_size
                    );
                }

                let window: Vec<&String> = current.iter().copied().collect();
                if let Some(doc) = join_pieces(&window) {
                    docs.push(doc);
                }

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match current.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }

            current.push_back(piece);
            total += len;
        }

        let window: Vec<&String> = current.iter().copied().collect();
        if let Some(doc) = join_pieces(&window) {
            docs.push(doc);
        }

        docs
    }
}

impl Default for RecursiveCharacterSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl TextSplitter for RecursiveCharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }
}

/// Split on `separator`, attaching each separator to the start of the piece
/// that follows it. Empty pieces are dropped; `""` splits into characters.
fn split_keeping_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices(separator) {
        pieces.push(&text[last..idx]);
        last = idx;
    }
    pieces.push(&text[last..]);

    pieces
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(String::from)
        .collect()
}

/// Concatenate pieces and trim; `None` when only whitespace remains
fn join_pieces<S: AsRef<str>>(pieces: &[S]) -> Option<String> {
    let mut joined = String::new();
    for piece in pieces {
        joined.push_str(piece.as_ref());
    }
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
