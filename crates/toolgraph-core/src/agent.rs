//! Agent
//!
//! Owns the provider, the tool registry and the configuration, and runs each
//! query through a fresh [`ConversationState`] and the orchestration graph.

use std::sync::Arc;

use serde::Serialize;

use crate::answer::extract_answer;
use crate::error::{AgentError, Result};
use crate::events::{EventSink, GraphEvent, TracingSink};
use crate::graph::{Graph, Termination};
use crate::prompt::{PromptLanguage, PromptTemplate};
use crate::provider::{GenerationOptions, LlmProvider};
use crate::state::ConversationState;
use crate::tool::{Tool, ToolRegistry, ToolResult};
use crate::turn::Transcript;

/// Default number of tool runs allowed per query
pub const DEFAULT_MAX_CYCLES: usize = 5;

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Instruction template and observation wording
    pub prompt: PromptTemplate,

    /// Tool runs allowed before the graph gives up
    pub max_cycles: usize,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prompt: PromptTemplate::default(),
            max_cycles: DEFAULT_MAX_CYCLES,
            generation: GenerationOptions::default(),
        }
    }
}

/// Everything one query produced
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub answer: String,
    pub termination: Termination,
    pub transcript: Transcript,
    pub tool_results: Vec<ToolResult>,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
    sink: Arc<dyn EventSink>,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
            sink: Arc::new(TracingSink),
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Replace the event sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Answer a query, failing if the cycle bound was hit
    pub async fn invoke(&self, query: &str) -> Result<String> {
        let report = self.run(query).await?;
        match report.termination {
            Termination::Answered => Ok(report.answer),
            Termination::CycleLimitExceeded => {
                Err(AgentError::CycleLimitExceeded(self.config.max_cycles))
            }
        }
    }

    /// Run a query and keep the transcript and tool results
    pub async fn run(&self, query: &str) -> Result<RunReport> {
        self.sink.on_event(&GraphEvent::QueryStarted { query });

        let mut state = ConversationState::new(query);
        let graph = Graph::new(
            self.provider.as_ref(),
            &self.tools,
            &self.config.prompt,
            &self.config.generation,
            self.sink.as_ref(),
            self.config.max_cycles,
        );
        let termination = graph.run(&mut state).await?;

        let answer = state
            .last_assistant()
            .map(|turn| extract_answer(&turn.text))
            .unwrap_or_default();
        self.sink.on_event(&GraphEvent::Finished { answer: &answer });

        let (transcript, tool_results) = state.into_parts();
        Ok(RunReport {
            answer,
            termination,
            transcript,
            tool_results,
        })
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
    sink: Option<Arc<dyn EventSink>>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            sink: None,
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.config.prompt = prompt;
        self
    }

    pub fn language(mut self, language: PromptLanguage) -> Self {
        self.config.prompt = PromptTemplate::for_language(language);
        self
    }

    pub fn generation(mut self, generation: GenerationOptions) -> Self {
        self.config.generation = generation;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    pub fn stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.config.generation.stop_sequences = stop;
        self
    }

    pub fn max_cycles(mut self, max: usize) -> Self {
        self.config.max_cycles = max;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        let agent = Agent::new(provider, Arc::new(self.tools), self.config);
        Ok(match self.sink {
            Some(sink) => agent.with_sink(sink),
            None => agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    #[test]
    fn test_builder_requires_provider() {
        let err = AgentBuilder::new().build().err().unwrap();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn test_builder_applies_settings() {
        let agent = AgentBuilder::new()
            .provider(Arc::new(ScriptedProvider::new(["hi"])))
            .language(PromptLanguage::English)
            .model("deepseek-reasoner")
            .max_cycles(2)
            .build()
            .unwrap();

        assert_eq!(agent.config().max_cycles, 2);
        assert_eq!(agent.config().generation.model, "deepseek-reasoner");
        assert_eq!(agent.config().prompt.language(), PromptLanguage::English);
        assert!(agent.tools().is_empty());
    }

    #[tokio::test]
    async fn test_direct_reply_extracts_answer() {
        let provider = Arc::new(ScriptedProvider::new([
            "Problem: hello\nThought: no tool needed\nAnswer: Hi there!",
        ]));
        let agent = Agent::with_defaults(provider, Arc::new(ToolRegistry::new()));

        let report = agent.run("hello").await.unwrap();
        assert_eq!(report.answer, "Hi there!");
        assert_eq!(report.termination, Termination::Answered);
        assert_eq!(report.transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_reply_without_answer_marker_is_returned_whole() {
        let provider = Arc::new(ScriptedProvider::new(["just text"]));
        let agent = Agent::with_defaults(provider, Arc::new(ToolRegistry::new()));
        assert_eq!(agent.invoke("q").await.unwrap(), "just text");
    }
}
