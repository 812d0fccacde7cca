//! Conversation State
//!
//! Everything one query accumulates: the transcript, the pending tool call
//! set by Decide and consumed by RunTool, and every tool result so far.
//! A fresh state is created per query and nothing in it is shared.

use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::tool::{ToolCall, ToolResult};
use crate::turn::{Role, Transcript, Turn};

#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversationState {
    transcript: Transcript,
    pending: Option<ToolCall>,
    tool_results: Vec<ToolResult>,
    cycles: usize,
}

impl ConversationState {
    /// Seed a conversation with the user's query
    pub fn new(query: impl Into<String>) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Turn::user(query));
        Self {
            transcript,
            ..Default::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn tool_results(&self) -> &[ToolResult] {
        &self.tool_results
    }

    pub fn pending(&self) -> Option<&ToolCall> {
        self.pending.as_ref()
    }

    /// Completed Run-Tool passes
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    pub fn last_assistant(&self) -> Option<&Turn> {
        self.transcript.last_with_role(Role::Assistant)
    }

    pub(crate) fn append(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// At most one call is pending; RunTool clears it every cycle
    pub(crate) fn set_pending(&mut self, call: ToolCall) -> Result<()> {
        if let Some(existing) = &self.pending {
            return Err(AgentError::Other(format!(
                "tool call '{}' is still pending",
                existing.name
            )));
        }
        self.pending = Some(call);
        Ok(())
    }

    pub(crate) fn take_pending(&mut self) -> Option<ToolCall> {
        self.pending.take()
    }

    pub(crate) fn record_result(&mut self, result: ToolResult) {
        self.tool_results.push(result);
        self.cycles += 1;
    }

    pub(crate) fn latest_result(&self) -> Option<&ToolResult> {
        self.tool_results.last()
    }

    pub(crate) fn into_parts(self) -> (Transcript, Vec<ToolResult>) {
        (self.transcript, self.tool_results)
    }
}
