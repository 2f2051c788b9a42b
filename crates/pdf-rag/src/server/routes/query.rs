//! Query endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{QueryRequest, QueryResponse};

/// POST /query - Answer a question from the indexed document
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let start = Instant::now();

    let question = request
        .question()
        .ok_or_else(|| Error::invalid_input("No query text provided"))?;

    tracing::info!("Query: \"{}\"", question);

    let answer = state
        .query_engine()
        .answer(question, state.store(), state.embedder(), state.llm())
        .await?;

    tracing::info!(
        "Answered with {} sources in {}ms",
        answer.sources.len(),
        start.elapsed().as_millis()
    );

    Ok(Json(answer))
}
