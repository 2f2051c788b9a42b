//! Provider abstractions for embeddings, generation and chunk storage
//!
//! The pipeline only talks to these traits, so the Ollama backends and the
//! SQLite store can be swapped for in-process fakes.

pub mod content_store;
pub mod embedding;
pub mod llm;
pub mod memory;
pub mod ollama;

pub use content_store::ContentStore;
pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use memory::MemoryStore;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
