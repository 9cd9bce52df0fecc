//! Canned inferencer for tests and offline runs

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

use super::inferencer::{InferenceError, Inferencer};

/// Replays queued results in order, then keeps returning a default reply.
///
/// Every prompt it receives is recorded.
pub struct ScriptedInferencer {
    script: Mutex<VecDeque<Result<String, InferenceError>>>,
    default_reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedInferencer {
    /// Always answer `reply`
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a result to be returned before the default reply
    pub fn then(self, result: Result<String, InferenceError>) -> Self {
        self.script.lock().push_back(result);
        self
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Inferencer for ScriptedInferencer {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        self.prompts.lock().push(prompt.to_string());
        match self.script.lock().pop_front() {
            Some(result) => result,
            None => Ok(self.default_reply.clone()),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
