//! One model generation and the follow-up it demands.

use tokio::sync::mpsc;

use react_core::tools::{execute_tool_call, parse_tool_args, ToolCall, ToolExecutor, ToolResult};
use react_core::{AgentError, AgentEvent, Message, ToolSchema};
use react_llm::LLMProvider;

use crate::config::AgentLoopConfig;
use crate::state::EpisodeState;

/// How a generation was classified once appended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// Output was cut off by the context window
    Truncated,
    /// Tool calls to dispatch, in request order
    ToolCalls(Vec<ToolCall>),
    /// Plain reply, answered with the continue message
    Continued,
}

/// A tool call paired with the result appended for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedCall {
    pub call: ToolCall,
    pub result: ToolResult,
}

/// Request one generation, append it and classify the turn.
///
/// Token usage is charged even for truncated generations. A truncated
/// generation is appended without its tool calls, since none of them run.
pub async fn generate_turn(
    state: &mut EpisodeState,
    llm: &dyn LLMProvider,
    tool_schemas: &[ToolSchema],
    config: &AgentLoopConfig,
    event_tx: &mpsc::Sender<AgentEvent>,
) -> Result<TurnOutcome, AgentError> {
    let generation = llm
        .generate(&state.conversation.messages, tool_schemas, &config.cache)
        .await
        .map_err(|error| AgentError::LLM(error.to_string()))?;

    state.budget.record_usage(&generation.usage);

    let truncated = generation.stop_reason.is_truncated();
    let _ = event_tx
        .send(AgentEvent::Generation {
            content: generation.content.clone(),
            truncated,
        })
        .await;

    if truncated {
        log::debug!(
            "[{}] Generation truncated by context window ({} messages)",
            state.id(),
            state.message_count()
        );
        state
            .conversation
            .add_message(Message::assistant(generation.content, None));
        return Ok(TurnOutcome::Truncated);
    }

    state.conversation.add_message(generation.to_message());

    if !generation.tool_calls.is_empty() {
        return Ok(TurnOutcome::ToolCalls(generation.tool_calls));
    }

    state
        .conversation
        .add_message(Message::user(config.continue_message.clone()));
    Ok(TurnOutcome::Continued)
}

/// Run each call in order and append its result right after the assistant message.
pub async fn dispatch_tool_calls(
    state: &mut EpisodeState,
    tools: &dyn ToolExecutor,
    calls: Vec<ToolCall>,
    event_tx: &mpsc::Sender<AgentEvent>,
) -> Vec<DispatchedCall> {
    let mut dispatched = Vec::with_capacity(calls.len());

    for call in calls {
        let arguments =
            parse_tool_args(&call.function.arguments).unwrap_or_else(|_| serde_json::json!({}));
        let _ = event_tx
            .send(AgentEvent::ToolStart {
                tool_call_id: call.id.clone(),
                tool_name: call.function.name.clone(),
                arguments,
            })
            .await;

        let result = execute_tool_call(&call, tools).await;
        log::debug!(
            "[{}] Tool '{}' ({}) finished, success={}",
            state.id(),
            call.function.name,
            call.id,
            result.success
        );

        let _ = event_tx
            .send(AgentEvent::ToolComplete {
                tool_call_id: call.id.clone(),
                result: result.clone(),
            })
            .await;

        state
            .conversation
            .add_message(Message::tool_result(call.id.clone(), result.result.clone()));
        dispatched.push(DispatchedCall { call, result });
    }

    dispatched
}
