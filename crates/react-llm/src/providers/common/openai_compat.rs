//! OpenAI-compatible request/response helpers.
//!
//! These build a "compat" JSON body without leaking internal
//! `react_core::Message` fields (like `id` / `created_at`) and decode the
//! non-streaming chat completion response into a [`GenerationResult`].

use std::collections::HashSet;

use react_core::{tools::ToolSchema, FunctionCall, Message, Role, TokenUsage, ToolCall};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::{LLMError, Result};
use crate::types::{GenerationResult, StopReason};

/// Convert internal [`Message`] values to an OpenAI-compatible JSON array.
///
/// Tool results whose requesting assistant message is no longer in the
/// history are skipped; the API rejects a `tool` message without one.
pub fn messages_to_openai_compat_json(messages: &[Message]) -> Vec<Value> {
    let mut requested: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(messages.len());

    for m in messages {
        if let Some(tool_calls) = &m.tool_calls {
            requested.extend(tool_calls.iter().map(|tc| tc.id.as_str()));
        }

        if m.role == Role::Tool {
            let answered = m
                .tool_call_id
                .as_deref()
                .is_some_and(|id| requested.contains(id));
            if !answered {
                log::debug!(
                    "Skipping tool result {:?} with no matching tool call",
                    m.tool_call_id
                );
                continue;
            }
        }

        let role = match m.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        };

        let mut msg = json!({
            "role": role,
            "content": m.content,
        });

        if let Some(tool_call_id) = &m.tool_call_id {
            msg["tool_call_id"] = json!(tool_call_id);
        }

        if let Some(tool_calls) = &m.tool_calls {
            msg["tool_calls"] = json!(tool_calls);
        }

        out.push(msg);
    }

    out
}

pub fn tools_to_openai_compat_json(tools: &[ToolSchema]) -> Vec<Value> {
    tools.iter().map(|t| json!(t)).collect()
}

/// Build a non-streaming chat completion request body.
pub fn build_openai_compat_body(
    model: &str,
    messages: &[Message],
    tools: &[ToolSchema],
    max_output_tokens: Option<u32>,
) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages_to_openai_compat_json(messages),
        "stream": false,
    });

    if !tools.is_empty() {
        body["tools"] = json!(tools_to_openai_compat_json(tools));
    }

    if let Some(max_tokens) = max_output_tokens {
        body["max_tokens"] = json!(max_tokens);
    }

    body
}

#[derive(Debug, Deserialize)]
pub struct OpenAICompatResponse {
    choices: Vec<OpenAICompatChoice>,
    usage: Option<OpenAICompatUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    message: OpenAICompatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAICompatToolCall>>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: Option<String>,
    function: OpenAICompatFunction,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

pub fn parse_openai_compat_response(data: &str) -> Result<GenerationResult> {
    let response: OpenAICompatResponse = serde_json::from_str(data)?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::InvalidResponse("response contained no choices".to_string()))?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|tc| ToolCall {
            id: tc.id,
            tool_type: tc.tool_type.unwrap_or_else(|| "function".to_string()),
            function: FunctionCall {
                name: tc.function.name,
                arguments: tc.function.arguments,
            },
        })
        .collect();

    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    Ok(GenerationResult {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        stop_reason: StopReason::from_finish_reason(choice.finish_reason.as_deref()),
        usage,
    })
}

/// Whether an error body reports that the prompt exceeded the context window.
pub fn is_context_length_error(body: &str) -> bool {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return false;
    };

    let code = value["error"]["code"].as_str().unwrap_or_default();
    let message = value["error"]["message"].as_str().unwrap_or_default();

    code == "context_length_exceeded" || message.contains("maximum context length")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_omits_internal_fields_and_empty_tools() {
        let messages = vec![Message::system("rules"), Message::user("Hello")];
        let body = build_openai_compat_body("gpt-4o", &messages, &[], None);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["stream"], false);
        assert!(body.get("tools").is_none());
        assert!(body["messages"][1].get("id").is_none());
        assert_eq!(body["messages"][1]["role"], "user");
    }

    #[test]
    fn tool_results_without_their_request_are_skipped() {
        let call = ToolCall::new("call_1", "search_file", "{}");
        let mut messages = vec![
            Message::system("rules"),
            Message::assistant("", Some(vec![call])),
            Message::tool_result("call_1", "found it"),
            Message::assistant("cut", None),
        ];

        let kept = messages_to_openai_compat_json(&messages);
        assert_eq!(kept.len(), 4);
        assert_eq!(kept[2]["tool_call_id"], "call_1");

        messages.remove(1);
        let trimmed = messages_to_openai_compat_json(&messages);
        let roles: Vec<&str> = trimmed.iter().map(|m| m["role"].as_str().unwrap()).collect();
        assert_eq!(roles, vec!["system", "assistant"]);
        assert_eq!(trimmed[1]["content"], "cut");
    }

    #[test]
    fn body_includes_max_tokens() {
        let body = build_openai_compat_body("gpt-4o", &[Message::user("hi")], &[], Some(512));
        assert_eq!(body["max_tokens"], 512);
    }

    #[test]
    fn parses_tool_call_response() {
        let data = r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"search_file","arguments":"{\"query\":\"x\"}"}}]},"finish_reason":"tool_calls"}],"usage":{"prompt_tokens":10,"completion_tokens":5,"total_tokens":15}}"#;

        let result = parse_openai_compat_response(data).unwrap();

        assert_eq!(result.content, "");
        assert_eq!(result.stop_reason, StopReason::ToolCalls);
        assert_eq!(result.tool_calls[0].function.name, "search_file");
        assert_eq!(result.usage.total_tokens, 15);
    }

    #[test]
    fn parses_length_finish_reason_as_truncation() {
        let data = r#"{"choices":[{"message":{"content":"partial"},"finish_reason":"length"}]}"#;
        let result = parse_openai_compat_response(data).unwrap();
        assert!(result.stop_reason.is_truncated());
        assert_eq!(result.usage, TokenUsage::default());
    }

    #[test]
    fn empty_choices_is_invalid() {
        let result = parse_openai_compat_response(r#"{"choices":[]}"#);
        assert!(matches!(result, Err(LLMError::InvalidResponse(_))));
    }

    #[test]
    fn detects_context_length_errors() {
        assert!(is_context_length_error(
            r#"{"error":{"message":"too long","code":"context_length_exceeded"}}"#
        ));
        assert!(is_context_length_error(
            r#"{"error":{"message":"This model's maximum context length is 8192 tokens"}}"#
        ));
        assert!(!is_context_length_error(r#"{"error":{"message":"Invalid API key"}}"#));
        assert!(!is_context_length_error("not json"));
    }
}
