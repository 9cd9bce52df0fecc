//! Document ingestion: turning uploads into plain text

pub mod extractor;

pub use extractor::TextExtractor;
