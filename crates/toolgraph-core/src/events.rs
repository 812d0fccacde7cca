//! Events emitted by the orchestration graph.
//!
//! The graph never writes logs directly. It reports each transition to an
//! [`EventSink`] passed in by the caller, so tests can assert on the exact
//! sequence of events and binaries can route them to `tracing`.
//!
//! | Sink | Use case |
//! |------|----------|
//! | [`NoopSink`] | Fire-and-forget runs |
//! | [`TracingSink`] | Structured logging via `tracing` (default) |
//! | [`FnSink`] | Closures, e.g. collecting events in tests |

use tracing::{debug, info, warn};

use crate::tool::{ToolCall, ToolOutcome, ToolResult};

/// Events emitted while a query runs through the graph.
#[derive(Debug)]
pub enum GraphEvent<'a> {
    /// A fresh conversation was seeded with the user query.
    QueryStarted { query: &'a str },
    /// AskModel is about to call the provider.
    AskingModel { cycle: usize },
    /// The provider returned text, appended as an assistant turn.
    ModelResponded { text: &'a str },
    /// Decide found a registered tool call.
    ToolRequested { call: &'a ToolCall },
    /// Decide found a tool name that is not registered; treated as a reply.
    UnknownTool { name: &'a str },
    /// Decide found no tool call.
    NoAction,
    /// RunTool is about to invoke a tool.
    ToolExecuting { call: &'a ToolCall },
    /// RunTool recorded a result.
    ToolFinished { result: &'a ToolResult },
    /// FoldResult appended an observation turn.
    ObservationAppended { text: &'a str },
    /// The model asked for another tool after the cycle bound was reached.
    CycleLimitReached { max_cycles: usize },
    /// The graph terminated.
    Finished { answer: &'a str },
}

impl GraphEvent<'_> {
    /// Short stable name, handy for assertions
    pub fn kind(&self) -> &'static str {
        match self {
            GraphEvent::QueryStarted { .. } => "query_started",
            GraphEvent::AskingModel { .. } => "asking_model",
            GraphEvent::ModelResponded { .. } => "model_responded",
            GraphEvent::ToolRequested { .. } => "tool_requested",
            GraphEvent::UnknownTool { .. } => "unknown_tool",
            GraphEvent::NoAction => "no_action",
            GraphEvent::ToolExecuting { .. } => "tool_executing",
            GraphEvent::ToolFinished { .. } => "tool_finished",
            GraphEvent::ObservationAppended { .. } => "observation_appended",
            GraphEvent::CycleLimitReached { .. } => "cycle_limit_reached",
            GraphEvent::Finished { .. } => "finished",
        }
    }
}

/// Receiver for graph events.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &GraphEvent<'_>);
}

/// Discards every event.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn on_event(&self, _event: &GraphEvent<'_>) {}
}

/// Forwards events to `tracing`.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: &GraphEvent<'_>) {
        match event {
            GraphEvent::QueryStarted { query } => info!(query, "Processing query"),
            GraphEvent::AskingModel { cycle } => debug!(cycle, "Calling model"),
            GraphEvent::ModelResponded { text } => {
                debug!(preview = %preview(text), "Model responded");
            }
            GraphEvent::ToolRequested { call } => {
                debug!(tool = %call.name, params = ?call.params, "Routing to tool");
            }
            GraphEvent::UnknownTool { name } => {
                debug!(tool = name, "Unregistered tool named, treating as reply");
            }
            GraphEvent::NoAction => debug!("No tool call, replying directly"),
            GraphEvent::ToolExecuting { call } => {
                debug!(tool = %call.name, params = ?call.params, "Executing tool");
            }
            GraphEvent::ToolFinished { result } => match &result.outcome {
                ToolOutcome::Success(text) => {
                    debug!(tool = %result.tool_name, output = %preview(text), "Tool succeeded");
                }
                ToolOutcome::Failure(error) => {
                    warn!(tool = %result.tool_name, error = %error, "Tool failed");
                }
            },
            GraphEvent::ObservationAppended { text } => {
                debug!(observation = %preview(text), "Folded tool result");
            }
            GraphEvent::CycleLimitReached { max_cycles } => {
                warn!(max_cycles, "Cycle limit reached");
            }
            GraphEvent::Finished { answer } => {
                info!(answer = %preview(answer), "Produced final answer");
            }
        }
    }
}

/// First 100 characters of a string
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(100).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// An event sink backed by a closure.
///
/// ```ignore
/// let sink = FnSink::new(|event| println!("{}", event.kind()));
/// ```
pub struct FnSink<F>(F)
where
    F: Fn(&GraphEvent<'_>) + Send + Sync;

impl<F> FnSink<F>
where
    F: Fn(&GraphEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventSink for FnSink<F>
where
    F: Fn(&GraphEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &GraphEvent<'_>) {
        (self.0)(event);
    }
}
