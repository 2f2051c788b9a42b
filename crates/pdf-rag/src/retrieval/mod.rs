//! Retrieval: similarity scoring and the question answering flow

mod search;

pub use search::{cosine_similarity, QueryEngine};
