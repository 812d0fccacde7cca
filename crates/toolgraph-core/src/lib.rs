//! # toolgraph-core
//!
//! Tool-calling agent core: a cyclic graph that alternates between asking
//! the model and running the tool it requested, with a provider-agnostic LLM
//! abstraction and an extensible tool system.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Agent                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │    Graph    │  │    Tools    │  │   LlmProvider       │  │
//! │  │  (AskModel, │──│   Registry  │──│   (Strategy)        │  │
//! │  │  RunTool..) │  └─────────────┘  └─────────────────────┘  │
//! │  └─────────────┘                                             │
//! │     parser ─ answer ─ prompt ─ state ─ events                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait keeps the graph independent of the transport;
//! see `toolgraph-runtime` for the DeepSeek client.

pub mod agent;
pub mod answer;
pub mod error;
pub mod events;
pub mod graph;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod testing;
pub mod tool;
pub mod turn;

pub use agent::{Agent, AgentBuilder, AgentConfig, RunReport, DEFAULT_MAX_CYCLES};
pub use answer::extract_answer;
pub use error::{AgentError, Result, ToolError};
pub use events::{EventSink, FnSink, GraphEvent, NoopSink, TracingSink};
pub use graph::{decide, Decision, Node, Termination};
pub use parser::extract_action;
pub use prompt::{PromptLanguage, PromptTemplate};
pub use provider::{Completion, GenerationOptions, LlmProvider};
pub use state::ConversationState;
pub use tool::{
    ParameterSchema, Tool, ToolCall, ToolOutcome, ToolParams, ToolRegistry, ToolResult, ToolSchema,
};
pub use turn::{Role, Transcript, Turn};
