//! Tool System
//!
//! Tools are capabilities the model can request by name. The registry maps
//! each unique name to an `Arc<dyn Tool>`; the graph resolves and invokes
//! them one call at a time, with no retries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::ToolError;

/// Named string parameters parsed from model output
pub type ToolParams = BTreeMap<String, String>;

/// Tool call parsed from an assistant turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Parameters as key-value pairs
    #[serde(default)]
    pub params: ToolParams,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ToolParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// What happened when a tool ran
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum ToolOutcome {
    Success(String),
    Failure(String),
}

/// Result from one tool execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub tool_name: String,

    /// Parameters the tool was called with
    pub params: ToolParams,

    /// Returned text or error message
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            tool_name: call.name.clone(),
            params: call.params.clone(),
            outcome: ToolOutcome::Success(output.into()),
        }
    }

    pub fn failure(call: &ToolCall, error: impl Into<String>) -> Self {
        Self {
            tool_name: call.name.clone(),
            params: call.params.clone(),
            outcome: ToolOutcome::Failure(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Success(_))
    }

    /// Output on success, error message on failure
    pub fn text(&self) -> &str {
        match &self.outcome {
            ToolOutcome::Success(text) | ToolOutcome::Failure(text) => text,
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
        }
    }
}

/// Tool descriptor shown to the model and listed over HTTP
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and parameters
    fn schema(&self) -> ToolSchema;

    /// Run the tool once with the parsed parameters
    async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError>;

    /// Validate parameters before invocation
    fn validate(&self, params: &ToolParams) -> Result<(), ToolError> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !params.contains_key(&param.name) {
                return Err(ToolError::missing_param(&param.name));
            }
        }

        Ok(())
    }
}

/// Registry for available tools
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!(tool = %name, "Replaced previously registered tool");
        }
    }

    /// Look up a tool by name
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Invoke a resolved tool exactly once
    pub async fn invoke(&self, tool: &dyn Tool, params: &ToolParams) -> Result<String, ToolError> {
        tool.validate(params)?;
        tool.invoke(params).await
    }

    /// All tool schemas, ordered by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|t| t.schema()).collect()
    }

    /// Tool names, ordered
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the `- name: description` list substituted into the prompt
    pub fn render_prompt_section(&self) -> String {
        self.schemas()
            .iter()
            .map(|schema| {
                let mut line = format!("- {}: {}", schema.name, schema.description);
                if !schema.parameters.is_empty() {
                    let params: Vec<String> = schema
                        .parameters
                        .iter()
                        .map(|p| format!("{} ({})", p.name, p.description))
                        .collect();
                    line.push_str(&format!(" [params: {}]", params.join("; ")));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Repeat the input".into(),
                parameters: vec![ParameterSchema::required("text", "Text to repeat")],
            }
        }

        async fn invoke(&self, params: &ToolParams) -> Result<String, ToolError> {
            Ok(params.get("text").cloned().unwrap_or_default())
        }
    }

    struct Clock;

    #[async_trait]
    impl Tool for Clock {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "clock".into(),
                description: "Current time".into(),
                parameters: vec![],
            }
        }

        async fn invoke(&self, _params: &ToolParams) -> Result<String, ToolError> {
            Ok("12:00".into())
        }
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);
        registry.register(Clock);

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("echo").is_some());
        assert!(registry.contains("clock"));
        assert!(registry.resolve("unknown").is_none());
        assert_eq!(registry.names(), vec!["clock", "echo"]);
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);
        registry.register(Echo);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_validates_required_params() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo);
        let tool = registry.resolve("echo").unwrap();

        let err = registry
            .invoke(tool.as_ref(), &ToolParams::new())
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::missing_param("text"));

        let call = ToolCall::new("echo").with_param("text", "hi");
        let out = registry.invoke(tool.as_ref(), &call.params).await.unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_prompt_section() {
        let mut registry = ToolRegistry::new();
        registry.register(Clock);
        registry.register(Echo);

        let section = registry.render_prompt_section();
        assert_eq!(
            section,
            "- clock: Current time\n- echo: Repeat the input [params: text (Text to repeat)]"
        );
    }

    #[test]
    fn test_result_outcome() {
        let call = ToolCall::new("calculator").with_param("expression", "1/0");
        let result = ToolResult::failure(&call, "Division by zero");
        assert!(!result.is_success());
        assert_eq!(result.text(), "Division by zero");
        assert_eq!(result.params.get("expression").unwrap(), "1/0");
    }
}
