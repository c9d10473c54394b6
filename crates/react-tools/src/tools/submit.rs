use async_trait::async_trait;
use react_core::tools::{Tool, ToolError, ToolResult};
use serde_json::json;

pub const SUBMIT_TOOL_NAME: &str = "submit";

/// Final-answer tool. Its result text is what the scorer sees.
pub struct SubmitTool;

impl SubmitTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SubmitTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for SubmitTool {
    fn name(&self) -> &str {
        SUBMIT_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Submit an answer for evaluation"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "answer": {
                    "type": "string",
                    "description": "Submitted answer"
                }
            },
            "required": ["answer"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let answer = args["answer"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'answer' parameter".to_string()))?;

        Ok(ToolResult::ok(answer.to_string()))
    }
}
