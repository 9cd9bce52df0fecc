//! Prompt construction and model output cleanup

pub mod formatter;
pub mod prompt;

pub use formatter::format_response;
pub use prompt::PromptBuilder;
