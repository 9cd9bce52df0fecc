//! Core types for docchat

pub mod document;
pub mod response;

pub use document::{DocumentRecord, FileType};
pub use response::{AskResponse, UploadResponse};
