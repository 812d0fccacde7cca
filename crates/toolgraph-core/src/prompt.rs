//! Prompt Contract
//!
//! The instruction template the model is asked to follow. Its section labels
//! are the ones [`crate::parser`] and [`crate::answer`] look for, so the
//! three must change together.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tool::{ToolOutcome, ToolResult};
use crate::turn::{Role, Transcript};

const CHINESE_SYSTEM: &str = r#"你是一个功能强大的AI助手，可以调用工具来帮助用户解决问题。

可用工具:
{tools}

你必须严格按照以下格式回答:

问题: <用户的问题>
思考: <分析用户需要什么，是否需要使用工具>
行动: <如果需要使用工具>
使用工具: <工具名称>
参数: <按照 key: value 的格式提供，多个参数用逗号分隔>
行动结果: <工具返回的结果>
回答: <你的最终回答>

示例:

问题: 2+2等于多少
思考: 这是一个计算问题，应该使用计算器工具。
行动:
使用工具: calculator
参数: expression: 2+2
行动结果: 计算结果: 4
回答: 2+2等于4。

问题: 北京的天气怎么样
思考: 用户想知道北京的天气，可以使用天气工具查询。
行动:
使用工具: weather
参数: location: 北京
行动结果: 北京的天气: 晴朗，温度26°C
回答: 北京目前天气晴朗，温度为26°C。

涉及计算的问题一定要使用calculator工具，不要自己计算。
每次回复最多使用一个工具。如果对话记录中已经有工具的执行结果，请直接给出回答。

对话记录:
{history}

当前输入: {input}"#;

const ENGLISH_SYSTEM: &str = r#"You are a capable AI assistant that can call tools to help the user.

Available tools:
{tools}

Always reply in exactly this format:

Problem: <the user's question>
Thought: <what the user needs and whether a tool is required>
Action: <only if a tool is needed>
Use tool: <tool name>
Parameters: <key: value pairs separated by commas>
Action Result: <what the tool returned>
Answer: <your final answer>

Example:

Problem: what is 2+2
Thought: this is arithmetic, so I should use the calculator.
Action:
Use tool: calculator
Parameters: expression: 2+2
Action Result: 4
Answer: 2+2 equals 4.

Always use the calculator for arithmetic instead of computing it yourself.
Use at most one tool per reply. If the conversation already contains the tool result, give the answer directly.

Conversation so far:
{history}

Current input: {input}"#;

/// Template language
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptLanguage {
    #[default]
    Chinese,
    English,
}

/// Instruction template plus the wording of observation turns
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Template with `{tools}`, `{history}` and `{input}` placeholders
    pub system: String,

    /// Observation for a successful tool, with `{tool}` and `{result}`
    pub observation_success: String,

    /// Observation for a failed tool, with `{tool}` and `{error}`
    pub observation_failure: String,

    /// Shown in place of `{history}` when there is none
    pub empty_history: String,

    #[serde(default)]
    language: PromptLanguage,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::chinese()
    }
}

impl PromptTemplate {
    pub fn chinese() -> Self {
        Self {
            system: CHINESE_SYSTEM.into(),
            observation_success: "{tool} executed, result: {result}".into(),
            observation_failure: "{tool} failed: {error}".into(),
            empty_history: "(无)".into(),
            language: PromptLanguage::Chinese,
        }
    }

    pub fn english() -> Self {
        Self {
            system: ENGLISH_SYSTEM.into(),
            observation_success: "{tool} executed, result: {result}".into(),
            observation_failure: "{tool} failed: {error}".into(),
            empty_history: "(none)".into(),
            language: PromptLanguage::English,
        }
    }

    pub fn for_language(language: PromptLanguage) -> Self {
        match language {
            PromptLanguage::Chinese => Self::chinese(),
            PromptLanguage::English => Self::english(),
        }
    }

    /// Parse a template from its JSON form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a template from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Replace the instruction text, keeping the observation wording
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn language(&self) -> PromptLanguage {
        self.language
    }

    /// Render the prompt for one AskModel step.
    ///
    /// `{input}` is the most recent user or observation turn; every turn
    /// before it goes into `{history}`.
    pub fn render(&self, tools: &str, transcript: &Transcript) -> String {
        let (prior, input) = transcript.split_last_input();
        let input = input.map_or("", |t| t.text.as_str());

        let history = if prior.is_empty() {
            self.empty_history.clone()
        } else {
            prior
                .iter()
                .map(|t| format!("[{}] {}", self.role_label(t.role), t.text.trim()))
                .collect::<Vec<_>>()
                .join("\n")
        };

        fill(
            &self.system,
            &[("tools", tools), ("history", &history), ("input", input)],
        )
    }

    /// Text of the observation turn narrating a tool result
    pub fn observation(&self, result: &ToolResult) -> String {
        match &result.outcome {
            ToolOutcome::Success(text) => fill(
                &self.observation_success,
                &[("tool", &result.tool_name), ("result", text)],
            ),
            ToolOutcome::Failure(error) => fill(
                &self.observation_failure,
                &[("tool", &result.tool_name), ("error", error)],
            ),
        }
    }

    fn role_label(&self, role: Role) -> &'static str {
        match (self.language, role) {
            (PromptLanguage::Chinese, Role::User) => "用户",
            (PromptLanguage::Chinese, Role::Assistant) => "助手",
            (PromptLanguage::Chinese, Role::Observation) => "工具",
            (PromptLanguage::English, Role::User) => "User",
            (PromptLanguage::English, Role::Assistant) => "Assistant",
            (PromptLanguage::English, Role::Observation) => "Observation",
        }
    }
}

/// Substitute `{key}` placeholders in a single pass, so substituted values
/// are never rescanned.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let matched = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, value)| (close, *value))
        });

        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
