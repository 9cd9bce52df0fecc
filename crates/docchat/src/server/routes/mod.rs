//! API routes for the docchat server

pub mod ask;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};

use crate::error::Result;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/ask/", get(ask::ask_question))
        .route("/ask", get(ask::ask_question))
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    let documents = state.db().count()?;
    let latest = state.db().latest_record()?.map(|record| {
        serde_json::json!({
            "id": record.id,
            "filename": record.filename,
            "file_type": record.file_type(),
            "created_at": record.created_at,
        })
    });

    Ok(Json(serde_json::json!({
        "name": "docchat",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Document Q&A backed by a local model runner",
        "runner": state.inferencer().name(),
        "model": state.inferencer().model(),
        "documents": documents,
        "latest_document": latest,
        "endpoints": {
            "POST /upload": "Upload a file and/or ask a question (multipart: file, prompt)",
            "GET /ask/?q=": "Literal, case-sensitive search over stored documents",
            "GET /health": "Liveness",
            "GET /ready": "Readiness",
            "GET /info": "This document"
        }
    })))
}
