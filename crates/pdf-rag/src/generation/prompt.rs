//! Prompt template for RAG generation

use crate::types::ScoredChunk;

/// Separator placed between retrieved chunks in the context block
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const RAG_TEMPLATE: &str = "Answer the question based only on the following context:

{context}

---

Answer the question based on the above context: {question}";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join chunk contents in rank order
    pub fn build_context(results: &[ScoredChunk]) -> String {
        results
            .iter()
            .map(|result| result.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Fill the template with context and question
    pub fn build_rag_prompt(question: &str, context: &str) -> String {
        // The context placeholder precedes the question one, so neither input is re-substituted
        RAG_TEMPLATE
            .replacen("{question}", question, 1)
            .replacen("{context}", context, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChunkId, StoredChunk};

    fn scored(index: u32, content: &str) -> ScoredChunk {
        ScoredChunk {
            chunk: StoredChunk {
                id: ChunkId::new("f.pdf", 0, index),
                content: content.to_string(),
                embedding: Vec::new(),
            },
            similarity: 1.0,
        }
    }

    #[test]
    fn test_build_context_joins_in_order() {
        let context = PromptBuilder::build_context(&[scored(0, "A"), scored(1, "B"), scored(2, "C")]);
        assert_eq!(context, "A\n\n---\n\nB\n\n---\n\nC");
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_build_rag_prompt() {
        let prompt = PromptBuilder::build_rag_prompt("What is X?", "X is a letter.");
        assert_eq!(
            prompt,
            "Answer the question based only on the following context:\n\n\
             X is a letter.\n\n---\n\n\
             Answer the question based on the above context: What is X?"
        );
    }

    #[test]
    fn test_placeholders_in_input_are_literal() {
        let prompt = PromptBuilder::build_rag_prompt("about {context}?", "mentions {question}");
        assert!(prompt.contains("mentions {question}"));
        assert!(prompt.ends_with("about {context}?"));
    }
}
