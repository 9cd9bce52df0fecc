//! Substring lookup over stored documents

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::AskResponse;

#[derive(Debug, Deserialize)]
pub struct AskParams {
    pub q: String,
}

/// GET /ask/?q= - beginning of the first document containing `q`
pub async fn ask_question(
    State(state): State<AppState>,
    Query(params): Query<AskParams>,
) -> Result<Json<AskResponse>> {
    let results = state.db().search(&params.q)?;
    tracing::info!("Search \"{}\": {} matching documents", params.q, results.len());

    let response = match results.first() {
        Some((_, content)) => AskResponse::from_content(content),
        None => AskResponse::not_found(),
    };

    Ok(Json(response))
}
