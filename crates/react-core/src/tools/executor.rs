use async_trait::async_trait;
use thiserror::Error;

use crate::tools::{ToolCall, ToolResult, ToolSchema};

/// Typed invocation failure. The `Display` text is shown to the model verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;
    fn list_tools(&self) -> Vec<ToolSchema>;
}

pub fn parse_tool_args(arguments: &str) -> Result<serde_json::Value> {
    let args_raw = arguments.trim();

    if args_raw.is_empty() {
        return Ok(serde_json::json!({}));
    }

    serde_json::from_str(args_raw)
        .map_err(|error| ToolError::InvalidArguments(format!("Invalid JSON arguments: {error}")))
}

/// Run a tool call and fold any failure into a result the model can read.
pub async fn execute_tool_call(tool_call: &ToolCall, tools: &dyn ToolExecutor) -> ToolResult {
    match tools.execute(tool_call).await {
        Ok(result) => result,
        Err(error) => {
            log::debug!(
                "Tool '{}' ({}) failed: {}",
                tool_call.function.name,
                tool_call.id,
                error
            );
            ToolResult::failed(format!("Error: {error}"))
        }
    }
}
