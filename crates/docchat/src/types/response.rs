//! Response bodies for the HTTP API

use serde::{Deserialize, Serialize};

/// Answer returned by `/ask/` when nothing matches
pub const NO_MATCH_ANSWER: &str = "No relevant information found.";

/// Maximum number of characters of a matching document returned by `/ask/`
pub const ASK_ANSWER_CHARS: usize = 500;

/// Body of `POST /upload`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    /// Model answer or inference error text; absent when no question was asked
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama: Option<String>,
}

impl UploadResponse {
    /// Neither a file nor a question was sent
    pub fn nothing_uploaded() -> Self {
        Self {
            message: "No file uploaded.".to_string(),
            ollama: None,
        }
    }

    /// A file was stored and no question asked
    pub fn stored(filename: &str) -> Self {
        Self {
            message: format!("File '{}' stored successfully!", filename),
            ollama: None,
        }
    }

    /// A question was answered (or the model failed, `answer` says which)
    pub fn answered(answer: String) -> Self {
        Self {
            message: "Processed prompt successfully.".to_string(),
            ollama: Some(answer),
        }
    }
}

/// Body of `GET /ask/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}

impl AskResponse {
    /// First [`ASK_ANSWER_CHARS`] characters of a matching document
    pub fn from_content(content: &str) -> Self {
        Self {
            answer: content.chars().take(ASK_ANSWER_CHARS).collect(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            answer: NO_MATCH_ANSWER.to_string(),
        }
    }
}
