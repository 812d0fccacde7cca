//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Only model-call failures and the cycle bound end a query. Parse
/// ambiguities and unknown tool names never become errors, and tool
/// failures are folded back into the conversation as [`ToolError`]s.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error (HTTP status, malformed body)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The model kept requesting tools past the configured bound
    #[error("Cycle limit ({0}) exceeded")]
    CycleLimitExceeded(usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a prompt template file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A prompt template file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::ProviderUnavailable(_) | AgentError::Io(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(msg) => format!("The AI service encountered an error: {}", msg),
            AgentError::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            AgentError::CycleLimitExceeded(_) => {
                "The request needed too many tool calls. Please try a simpler query.".into()
            }
            AgentError::Config(msg) => format!("The agent is misconfigured: {}", msg),
            _ => "An unexpected error occurred.".into(),
        }
    }
}

/// Failure raised by a tool invocation.
///
/// Carries only the message; the graph narrates it back to the model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A required parameter was not supplied
    pub fn missing_param(name: &str) -> Self {
        Self::new(format!("missing required parameter: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable() {
        assert!(AgentError::ProviderUnavailable("down".into()).is_retryable());
        assert!(!AgentError::Provider("400".into()).is_retryable());
        assert!(!AgentError::CycleLimitExceeded(5).is_retryable());
    }

    #[test]
    fn test_tool_error_display() {
        let err = ToolError::missing_param("expression");
        assert_eq!(err.to_string(), "missing required parameter: expression");
    }
}
