//! Query request types

use serde::{Deserialize, Serialize};

/// Query request for RAG search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    #[serde(default)]
    pub query_text: Option<String>,
}

impl QueryRequest {
    /// Create a request for the given question
    pub fn new(query_text: impl Into<String>) -> Self {
        Self {
            query_text: Some(query_text.into()),
        }
    }

    /// The question, if present and not blank
    pub fn question(&self) -> Option<&str> {
        self.query_text
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_question_is_missing() {
        let request: QueryRequest = serde_json::from_str(r#"{"query_text": "   "}"#).unwrap();
        assert!(request.question().is_none());

        let request: QueryRequest = serde_json::from_str("{}").unwrap();
        assert!(request.question().is_none());
    }

    #[test]
    fn test_question_is_trimmed() {
        let request = QueryRequest::new("  what is in the report?\n");
        assert_eq!(request.question(), Some("what is in the report?"));
    }
}
