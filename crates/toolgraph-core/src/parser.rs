//! Action Parser
//!
//! Recovers a tool call from free-text model output that follows the
//! Problem / Thought / Action / Action Result / Answer layout. Each stage
//! degrades to "no call" or "no parameters" instead of failing:
//!
//! 1. action section: after the first `Action:` up to `Action Result:`,
//!    `Answer:` or end of text
//! 2. tool name: `Use tool: <word>` inside the section
//! 3. parameter span: after `Parameters:` up to the next label
//! 4. `key: value` pairs, falling back to a `{...}` object literal
//!
//! Chinese labels (`行动:`, `使用工具:`, `参数:`, `行动结果:`, `回答:`) and
//! full-width colons are accepted alongside the English ones.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::tool::{ToolCall, ToolParams};

static ACTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bAction\s*[:：]|行动\s*[:：]").expect("Invalid regex"));

static ACTION_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Action[\s_-]*Result|Answer)\s*[:：]|(?:行动结果|回答)\s*[:：]")
        .expect("Invalid regex")
});

static TOOL_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bUse[\s_-]*tool|使用工具)\s*[:：]\s*(\w+)").expect("Invalid regex")
});

static PARAMS_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bParameters?|参数)\s*[:：]").expect("Invalid regex")
});

static PARAMS_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:Problem|Thought|Use[\s_-]*tool)\s*[:：]|(?:问题|思考|使用工具)\s*[:：]",
    )
    .expect("Invalid regex")
});

static PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\w+)[ \t]*[:：][ \t]*([^,，\n]+)").expect("Invalid regex")
});

static OBJECT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("Invalid regex"));

/// Extract the first tool call from model output.
///
/// Returns `None` when the text has no action section or the section names
/// no tool. Missing or unparseable parameters yield an empty map.
pub fn extract_action(text: &str) -> Option<ToolCall> {
    let section = action_section(text)?;
    let name = TOOL_NAME.captures(section)?.get(1)?.as_str().to_string();

    let params = params_span(section)
        .map(parse_params)
        .unwrap_or_default();

    tracing::debug!(tool = %name, ?params, "Extracted tool call");
    Some(ToolCall { name, params })
}

/// Text between the first action label and the next result/answer label
fn action_section(text: &str) -> Option<&str> {
    let start = ACTION_MARKER.find(text)?.end();
    let rest = &text[start..];
    let end = ACTION_END.find(rest).map_or(rest.len(), |m| m.start());
    Some(&rest[..end])
}

fn params_span(section: &str) -> Option<&str> {
    let start = PARAMS_MARKER.find(section)?.end();
    let rest = &section[start..];
    let end = PARAMS_END.find(rest).map_or(rest.len(), |m| m.start());
    Some(rest[..end].trim())
}

fn parse_params(span: &str) -> ToolParams {
    let mut params = ToolParams::new();

    for caps in PAIR.captures_iter(span) {
        let value = caps[2].trim();
        if !value.is_empty() {
            params.insert(caps[1].to_string(), value.to_string());
        }
    }

    if params.is_empty() {
        params = parse_object_literal(span).unwrap_or_default();
    }

    params
}

/// Fallback for `{"key": "value"}` style parameters
fn parse_object_literal(span: &str) -> Option<ToolParams> {
    let literal = OBJECT_LITERAL.find(span)?.as_str();

    let object: Map<String, Value> = match serde_json::from_str(literal) {
        Ok(object) => object,
        Err(e) => {
            tracing::debug!(error = %e, literal, "Ignoring malformed parameter object");
            return None;
        }
    };

    Some(
        object
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ToolParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_no_action_marker() {
        assert_eq!(extract_action("Answer: 4"), None);
        assert_eq!(extract_action(""), None);
        assert_eq!(extract_action("Use tool: calculator Parameters: a: 1"), None);
    }

    #[test]
    fn test_action_without_tool_name() {
        assert_eq!(extract_action("Thought: easy\nAction: none needed\nAnswer: hi"), None);
    }

    #[test]
    fn test_inline_pairs() {
        let call = extract_action("Action: Use tool: X Parameters: a: 1, b: 2").unwrap();
        assert_eq!(call.name, "X");
        assert_eq!(call.params, params(&[("a", "1"), ("b", "2")]));
    }

    #[test]
    fn test_multiline_layout() {
        let text = "Problem: 2+2等于多少\n\
                    Thought: use the calculator\n\
                    Action:\n\
                    Use tool: calculator\n\
                    Parameters: expression: 2+2\n\
                    Action Result: 4\n\
                    Answer: 4";
        let call = extract_action(text).unwrap();
        assert_eq!(call.name, "calculator");
        assert_eq!(call.params, params(&[("expression", "2+2")]));
    }

    #[test]
    fn test_chinese_labels() {
        let text = "问题: 北京的天气怎么样\n\
                    思考: 需要查询天气\n\
                    行动: \n\
                    使用工具: weather\n\
                    参数: location: 北京\n\
                    行动结果: 北京的天气: 晴朗\n\
                    回答: 晴朗";
        let call = extract_action(text).unwrap();
        assert_eq!(call.name, "weather");
        assert_eq!(call.params, params(&[("location", "北京")]));
    }

    #[test]
    fn test_full_width_colons() {
        let call = extract_action("行动：使用工具：calculator 参数：expression：3*4").unwrap();
        assert_eq!(call.name, "calculator");
        assert_eq!(call.params, params(&[("expression", "3*4")]));
    }

    #[test]
    fn test_missing_parameters_is_empty() {
        let call = extract_action("Action: Use tool: clock\nAnswer: soon").unwrap();
        assert_eq!(call.name, "clock");
        assert!(call.params.is_empty());
    }

    #[test]
    fn test_json_fallback() {
        let call = extract_action(r#"Action: Use tool: X Parameters: {"a": "1"}"#).unwrap();
        assert_eq!(call.params, params(&[("a", "1")]));
    }

    #[test]
    fn test_json_fallback_renders_non_strings() {
        let call =
            extract_action("Action:\nUse tool: X\nParameters: {\"n\": 3, \"ok\": true}").unwrap();
        assert_eq!(call.params, params(&[("n", "3"), ("ok", "true")]));
    }

    #[test]
    fn test_malformed_json_yields_empty_params() {
        let call = extract_action("Action: Use tool: X Parameters: {\"a\" \"1\"").unwrap();
        assert_eq!(call.name, "X");
        assert!(call.params.is_empty());

        let call = extract_action("Action: Use tool: X Parameters: {'a' '1'}").unwrap();
        assert!(call.params.is_empty());
    }

    #[test]
    fn test_only_first_action_section_is_used() {
        let text = "Action: Use tool: first Parameters: a: 1\n\
                    Action Result: done\n\
                    Action: Use tool: second Parameters: b: 2";
        let call = extract_action(text).unwrap();
        assert_eq!(call.name, "first");
        assert_eq!(call.params, params(&[("a", "1")]));
    }

    #[test]
    fn test_section_stops_at_answer() {
        let text = "Action: nothing to do\nAnswer: Use tool: calculator";
        assert_eq!(extract_action(text), None);
    }

    #[test]
    fn test_action_result_label_is_not_an_action() {
        assert_eq!(extract_action("Action Result: Use tool: calculator"), None);
        assert_eq!(extract_action("行动结果: 使用工具: calculator"), None);
    }

    #[test]
    fn test_params_stop_at_next_label() {
        let text = "Action:\nParameters: expression: 1+1\nUse tool: calculator";
        let call = extract_action(text).unwrap();
        assert_eq!(call.name, "calculator");
        assert_eq!(call.params, params(&[("expression", "1+1")]));
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let call = extract_action("Action: Use tool: alarm Parameters: time: 10:30").unwrap();
        assert_eq!(call.params, params(&[("time", "10:30")]));
    }

    #[test]
    fn test_stateless_between_calls() {
        let text = "Action: Use tool: X Parameters: a: 1";
        assert_eq!(extract_action(text), extract_action(text));
    }
}
