//! Upload endpoint: store a document and/or ask a question about it

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::generation::PromptBuilder;
use crate::ingestion::TextExtractor;
use crate::server::state::AppState;
use crate::types::UploadResponse;

/// A file part of the upload form
struct UploadedFile {
    filename: String,
    data: Vec<u8>,
}

/// POST /upload - multipart form with optional `file` and `prompt`
///
/// Without a file, the most recently stored document is used as context. Model
/// failures are reported inside the `ollama` field with a 200 status.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<UploadedFile> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Multipart(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::Multipart(format!("Failed to read file: {}", e)))?;

                // Browsers send an empty, unnamed part for an empty file input
                if filename.is_empty() && data.is_empty() {
                    continue;
                }
                file = Some(UploadedFile {
                    filename: if filename.is_empty() { "upload".to_string() } else { filename },
                    data: data.to_vec(),
                });
            }
            "prompt" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::Multipart(format!("Failed to read prompt: {}", e)))?;
                prompt = Some(text);
            }
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    let document_text = match &file {
        Some(upload) => Some(ingest_file(&state, upload).await?),
        None => None,
    };

    let question = match prompt.filter(|p| !p.trim().is_empty()) {
        Some(question) => question,
        None => {
            return Ok(Json(match &file {
                Some(upload) => UploadResponse::stored(&upload.filename),
                None => UploadResponse::nothing_uploaded(),
            }));
        }
    };

    let context = match document_text {
        Some(text) => Some(text),
        None => state.db().fetch_latest()?,
    };

    let combined_prompt = PromptBuilder::build(context.as_deref(), &question);

    let answer = match state.inferencer().infer(&combined_prompt).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::warn!("Inference failed: {:?}", e);
            e.to_string()
        }
    };

    Ok(Json(UploadResponse::answered(answer)))
}

/// Extract, keep the raw bytes on disk and append the text to the store.
///
/// Extraction failures degrade to empty text so a record is always written.
async fn ingest_file(state: &AppState, upload: &UploadedFile) -> Result<String> {
    tracing::info!("Processing file: {} ({} bytes)", upload.filename, upload.data.len());

    let filename = upload.filename.clone();
    let data = upload.data.clone();
    let text = match tokio::task::spawn_blocking(move || TextExtractor::extract(&filename, &data))
        .await
    {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            tracing::warn!("{}; storing empty text", e);
            String::new()
        }
        Err(e) => {
            tracing::warn!(
                "Extraction of {} aborted: {}; storing empty text",
                upload.filename,
                e
            );
            String::new()
        }
    };

    state.uploads().save(&upload.filename, &upload.data).await?;
    state.db().save(&upload.filename, &text)?;

    tracing::info!("Stored '{}' ({} chars extracted)", upload.filename, text.chars().count());
    Ok(text)
}
