//! Stored documents and file type detection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File formats the extractor distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Anything else, decoded as text
    Text,
}

impl FileType {
    /// Detect file type from a filename.
    ///
    /// Matching is on the literal suffix, so `REPORT.PDF` is read as text.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(".pdf") {
            Self::Pdf
        } else if filename.ends_with(".docx") {
            Self::Docx
        } else {
            Self::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the append-only document table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Assigned by the database, increasing with every insert
    pub id: i64,
    /// Name the file was uploaded under (not unique)
    pub filename: String,
    /// Extracted text, empty when extraction produced nothing
    pub content: String,
    /// Insertion time
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    pub fn file_type(&self) -> FileType {
        FileType::from_filename(&self.filename)
    }
}
