//! Inferencer trait for turning a prompt into model output

use async_trait::async_trait;
use thiserror::Error;

/// Ways a model invocation can fail.
///
/// The `Display` text is what the user sees in place of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    /// Runner exited unsuccessfully; carries its trimmed stderr
    #[error("Error from Ollama: {0}")]
    NonZeroExit(String),

    /// Runner succeeded but printed nothing but whitespace
    #[error("Error: Ollama returned no output.")]
    EmptyOutput,

    /// Runner exceeded the configured time limit and was killed
    #[error("Error: Ollama query timed out.")]
    Timeout,

    /// Anything else: spawn failure, broken pipes, ...
    #[error("Error: {0}")]
    Unexpected(String),
}

/// Trait for prompt-to-answer generation
///
/// Implementations:
/// - `ProcessInferencer`: spawns a local runner such as `ollama run gemma:2b`
/// - `ScriptedInferencer`: replays canned results, for tests
#[async_trait]
pub trait Inferencer: Send + Sync {
    /// Answer `prompt`, returning formatted text on success
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model identifier in use
    fn model(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_texts() {
        assert_eq!(
            InferenceError::NonZeroExit("boom".into()).to_string(),
            "Error from Ollama: boom"
        );
        assert_eq!(
            InferenceError::EmptyOutput.to_string(),
            "Error: Ollama returned no output."
        );
        assert_eq!(InferenceError::Timeout.to_string(), "Error: Ollama query timed out.");
        assert_eq!(
            InferenceError::Unexpected("No such file or directory".into()).to_string(),
            "Error: No such file or directory"
        );
    }
}
