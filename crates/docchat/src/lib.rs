//! docchat: document question answering backed by a local model runner
//!
//! Uploaded PDF, DOCX and plain-text files are reduced to plain text and kept in
//! an append-only SQLite table. Questions are answered by handing a grounded
//! prompt to an external model process (`ollama run gemma:2b` by default) and
//! cleaning up whatever it prints.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod server;
pub mod storage;
pub mod types;

pub use config::DocchatConfig;
pub use error::{Error, Result};
pub use providers::{InferenceError, Inferencer};
pub use types::{
    document::{DocumentRecord, FileType},
    response::{AskResponse, UploadResponse},
};
