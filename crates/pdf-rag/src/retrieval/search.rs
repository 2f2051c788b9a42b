//! Query engine: embed the question, retrieve top-k chunks, prompt the model

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::providers::{ContentStore, EmbeddingProvider, LlmProvider};
use crate::types::QueryResponse;

/// Cosine similarity of two vectors; 0.0 for mismatched lengths or zero norms
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Answers questions from the content store
pub struct QueryEngine {
    top_k: usize,
}

impl QueryEngine {
    /// Create an engine retrieving `top_k` chunks per question
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Create from configuration
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.top_k)
    }

    /// Chunks retrieved per question
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer `question` using only the retrieved context
    pub async fn answer(
        &self,
        question: &str,
        store: &dyn ContentStore,
        embedder: &dyn EmbeddingProvider,
        llm: &dyn LlmProvider,
    ) -> Result<QueryResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::invalid_input("No query text provided"));
        }

        let query_embedding = embedder.embed(question).await?;
        let results = store.search(&query_embedding, self.top_k).await?;

        tracing::info!(
            "Retrieved {} chunks from {} for query",
            results.len(),
            store.name()
        );

        let context = PromptBuilder::build_context(&results);
        let prompt = PromptBuilder::build_rag_prompt(question, &context);
        let response = llm.generate(&prompt).await?;

        let sources = results.iter().map(|r| r.chunk.id.to_string()).collect();
        Ok(QueryResponse::new(response, sources))
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}
