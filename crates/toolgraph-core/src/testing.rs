//! Scripted provider for tests and offline demos.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{AgentError, Result};
use crate::provider::{Completion, GenerationOptions, LlmProvider};

enum Script {
    Queue(VecDeque<String>),
    Repeat(String),
    Fail(String),
}

/// Replays canned responses and records every prompt it receives.
pub struct ScriptedProvider {
    script: Mutex<Script>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    /// Return the responses in order, then fail
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Queue(
            responses.into_iter().map(Into::into).collect(),
        ))
    }

    /// Return the same response forever
    pub fn repeating(response: impl Into<String>) -> Self {
        Self::with_script(Script::Repeat(response.into()))
    }

    /// Fail every call with a provider error
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_script(Script::Fail(message.into()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Mutex::new(script),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn calls(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(!matches!(*self.script.lock().await, Script::Fail(_)))
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        self.prompts.lock().await.push(prompt.to_string());

        let content = match &mut *self.script.lock().await {
            Script::Queue(queue) => queue
                .pop_front()
                .ok_or_else(|| AgentError::Provider("script exhausted".into()))?,
            Script::Repeat(text) => text.clone(),
            Script::Fail(message) => return Err(AgentError::Provider(message.clone())),
        };

        Ok(Completion::text(content, options.model.clone()))
    }
}
