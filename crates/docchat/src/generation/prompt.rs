//! Prompt construction for document questions

/// Prompt builder for document-grounded questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the prompt sent to the model.
    ///
    /// With non-blank document text the whole document is embedded, untruncated,
    /// ahead of the question. Without it the question is returned as is.
    pub fn build(document_text: Option<&str>, question: &str) -> String {
        match document_text {
            Some(text) if !text.trim().is_empty() => Self::build_grounded_prompt(text, question),
            _ => question.to_string(),
        }
    }

    /// Document first, then the relevance instruction, then the question
    fn build_grounded_prompt(document: &str, question: &str) -> String {
        format!(
            r#"
Here is the document:

{document}

Now answer the following question.
If it is related to the document, use the document.
If it is not related, just answer from your own knowledge:

{question}
"#,
            document = document,
            question = question
        )
    }
}
