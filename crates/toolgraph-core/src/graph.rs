//! Orchestration Graph
//!
//! A small cyclic state machine driving one [`ConversationState`]:
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            ▼                                      │
//!       ┌─────────┐    ┌────────┐    ┌─────────┐    ┌────────────┐
//!  ───▶ │AskModel │──▶ │ Decide │──▶ │ RunTool │──▶ │ FoldResult │
//!       └─────────┘    └────────┘    └─────────┘    └────────────┘
//!                          │
//!                          ▼
//!                     ┌───────────┐
//!                     │ Terminate │
//!                     └───────────┘
//! ```
//!
//! Every step awaits the previous one; nothing runs concurrently for the
//! same state. Only a provider failure aborts a run. Tool failures become
//! observation turns and the loop continues.

use crate::error::{AgentError, Result};
use crate::events::{EventSink, GraphEvent};
use crate::parser::extract_action;
use crate::prompt::PromptTemplate;
use crate::provider::{GenerationOptions, LlmProvider};
use crate::state::ConversationState;
use crate::tool::{ToolCall, ToolRegistry, ToolResult};
use crate::turn::{Role, Turn};

/// Graph states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node {
    AskModel,
    Decide,
    RunTool,
    FoldResult,
    Terminate(Termination),
}

/// Why the graph stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model replied without a registered tool call
    Answered,
    /// The model asked for another tool after `max_cycles` tool runs
    CycleLimitExceeded,
}

/// What an assistant turn asks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// A registered tool should run
    Tool(ToolCall),
    /// A tool was named but is not registered
    UnknownTool(String),
    /// No tool call at all
    NoAction,
}

/// Classify an assistant turn against the registry.
pub fn decide(text: &str, tools: &ToolRegistry) -> Decision {
    match extract_action(text) {
        Some(call) if tools.contains(&call.name) => Decision::Tool(call),
        Some(call) => Decision::UnknownTool(call.name),
        None => Decision::NoAction,
    }
}

/// Borrowed view of everything one run needs
pub struct Graph<'a> {
    provider: &'a dyn LlmProvider,
    tools: &'a ToolRegistry,
    prompt: &'a PromptTemplate,
    generation: &'a GenerationOptions,
    sink: &'a dyn EventSink,
    max_cycles: usize,
    tools_section: String,
}

impl<'a> Graph<'a> {
    pub fn new(
        provider: &'a dyn LlmProvider,
        tools: &'a ToolRegistry,
        prompt: &'a PromptTemplate,
        generation: &'a GenerationOptions,
        sink: &'a dyn EventSink,
        max_cycles: usize,
    ) -> Self {
        Self {
            provider,
            tools,
            prompt,
            generation,
            sink,
            max_cycles,
            tools_section: tools.render_prompt_section(),
        }
    }

    /// Drive the state from AskModel until Terminate
    pub async fn run(&self, state: &mut ConversationState) -> Result<Termination> {
        let mut node = Node::AskModel;
        loop {
            if let Node::Terminate(termination) = node {
                return Ok(termination);
            }
            node = self.step(node, state).await?;
        }
    }

    /// Execute one node and return the next one.
    ///
    /// Out-of-order steps (Decide while a call is pending, RunTool with
    /// none) fail instead of corrupting the state.
    pub async fn step(&self, node: Node, state: &mut ConversationState) -> Result<Node> {
        match node {
            Node::AskModel => {
                self.ask_model(state).await?;
                Ok(Node::Decide)
            }
            Node::Decide => self.route(state),
            Node::RunTool => {
                self.run_tool(state).await?;
                Ok(Node::FoldResult)
            }
            Node::FoldResult => {
                self.fold_result(state);
                Ok(Node::AskModel)
            }
            Node::Terminate(termination) => Ok(Node::Terminate(termination)),
        }
    }

    async fn ask_model(&self, state: &mut ConversationState) -> Result<()> {
        self.sink.on_event(&GraphEvent::AskingModel {
            cycle: state.cycles() + 1,
        });

        let prompt = self.prompt.render(&self.tools_section, state.transcript());
        let completion = self.provider.complete(&prompt, self.generation).await?;

        self.sink.on_event(&GraphEvent::ModelResponded {
            text: &completion.content,
        });
        state.append(Turn::assistant(completion.content));
        Ok(())
    }

    fn route(&self, state: &mut ConversationState) -> Result<Node> {
        let text = state
            .transcript()
            .last()
            .filter(|turn| turn.role == Role::Assistant)
            .map_or("", |turn| turn.text.as_str());

        match decide(text, self.tools) {
            Decision::Tool(call) => {
                if state.cycles() >= self.max_cycles {
                    self.sink.on_event(&GraphEvent::CycleLimitReached {
                        max_cycles: self.max_cycles,
                    });
                    return Ok(Node::Terminate(Termination::CycleLimitExceeded));
                }
                self.sink.on_event(&GraphEvent::ToolRequested { call: &call });
                state.set_pending(call)?;
                Ok(Node::RunTool)
            }
            Decision::UnknownTool(name) => {
                self.sink.on_event(&GraphEvent::UnknownTool { name: &name });
                Ok(Node::Terminate(Termination::Answered))
            }
            Decision::NoAction => {
                self.sink.on_event(&GraphEvent::NoAction);
                Ok(Node::Terminate(Termination::Answered))
            }
        }
    }

    async fn run_tool(&self, state: &mut ConversationState) -> Result<()> {
        let call = state
            .take_pending()
            .ok_or_else(|| AgentError::Other("RunTool entered without a pending tool call".into()))?;

        self.sink.on_event(&GraphEvent::ToolExecuting { call: &call });

        let result = match self.tools.resolve(&call.name) {
            Some(tool) => match self.tools.invoke(tool.as_ref(), &call.params).await {
                Ok(output) => ToolResult::success(&call, output),
                Err(e) => ToolResult::failure(&call, e.message),
            },
            None => ToolResult::failure(&call, format!("tool not registered: {}", call.name)),
        };

        self.sink.on_event(&GraphEvent::ToolFinished { result: &result });
        state.record_result(result);
        Ok(())
    }

    fn fold_result(&self, state: &mut ConversationState) {
        let Some(result) = state.latest_result() else {
            return;
        };
        let text = self.prompt.observation(result);

        self.sink.on_event(&GraphEvent::ObservationAppended { text: &text });
        state.append(Turn::observation(text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::events::NoopSink;
    use crate::testing::ScriptedProvider;
    use crate::tool::{Tool, ToolParams, ToolSchema};
    use async_trait::async_trait;

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "upper".into(),
                description: "Uppercase text".into(),
                parameters: vec![],
            }
        }

        async fn invoke(&self, params: &ToolParams) -> std::result::Result<String, ToolError> {
            Ok(params.get("text").map(|t| t.to_uppercase()).unwrap_or_default())
        }
    }

    fn registry() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(Upper);
        tools
    }

    #[test]
    fn test_decide_routes_registered_tool() {
        let tools = registry();
        let decision = decide("Action: Use tool: upper Parameters: text: hi", &tools);
        assert_eq!(
            decision,
            Decision::Tool(ToolCall::new("upper").with_param("text", "hi"))
        );
    }

    #[test]
    fn test_decide_unknown_tool_and_no_action() {
        let tools = registry();
        assert_eq!(
            decide("Action: Use tool: lower", &tools),
            Decision::UnknownTool("lower".into())
        );
        assert_eq!(decide("Answer: hi", &tools), Decision::NoAction);
    }

    #[tokio::test]
    async fn test_step_sequence() {
        let provider = ScriptedProvider::new([
            "Action: Use tool: upper Parameters: text: abc",
            "Answer: ABC",
        ]);
        let tools = registry();
        let prompt = PromptTemplate::english();
        let generation = GenerationOptions::default();
        let graph = Graph::new(&provider, &tools, &prompt, &generation, &NoopSink, 3);

        let mut state = ConversationState::new("shout abc");
        let mut node = Node::AskModel;
        let mut visited = vec![node];
        while !matches!(node, Node::Terminate(_)) {
            node = graph.step(node, &mut state).await.unwrap();
            visited.push(node);
        }

        assert_eq!(
            visited,
            vec![
                Node::AskModel,
                Node::Decide,
                Node::RunTool,
                Node::FoldResult,
                Node::AskModel,
                Node::Decide,
                Node::Terminate(Termination::Answered),
            ]
        );
        assert!(state.pending().is_none());
        assert_eq!(state.tool_results()[0].text(), "ABC");
        assert_eq!(
            state.transcript().turns()[2].text,
            "upper executed, result: ABC"
        );
    }

    #[tokio::test]
    async fn test_cycle_limit_terminates() {
        let provider = ScriptedProvider::repeating("Action: Use tool: upper Parameters: text: a");
        let tools = registry();
        let prompt = PromptTemplate::english();
        let generation = GenerationOptions::default();
        let graph = Graph::new(&provider, &tools, &prompt, &generation, &NoopSink, 2);

        let mut state = ConversationState::new("loop forever");
        let termination = graph.run(&mut state).await.unwrap();

        assert_eq!(termination, Termination::CycleLimitExceeded);
        assert_eq!(state.tool_results().len(), 2);
        assert_eq!(provider.calls().await, 3);
    }

    #[tokio::test]
    async fn test_run_tool_without_pending_is_an_error() {
        let provider = ScriptedProvider::new(["unused"]);
        let tools = registry();
        let prompt = PromptTemplate::english();
        let generation = GenerationOptions::default();
        let graph = Graph::new(&provider, &tools, &prompt, &generation, &NoopSink, 2);

        let mut state = ConversationState::new("q");
        assert!(graph.step(Node::RunTool, &mut state).await.is_err());
    }

    #[tokio::test]
    async fn test_decide_twice_keeps_first_pending_call() {
        let provider = ScriptedProvider::new(["Action: Use tool: upper Parameters: text: a"]);
        let tools = registry();
        let prompt = PromptTemplate::english();
        let generation = GenerationOptions::default();
        let graph = Graph::new(&provider, &tools, &prompt, &generation, &NoopSink, 2);

        let mut state = ConversationState::new("q");
        let node = graph.step(Node::AskModel, &mut state).await.unwrap();
        assert_eq!(graph.step(node, &mut state).await.unwrap(), Node::RunTool);
        assert!(graph.step(Node::Decide, &mut state).await.is_err());
        assert_eq!(state.pending().unwrap().params["text"], "a");
    }
}
