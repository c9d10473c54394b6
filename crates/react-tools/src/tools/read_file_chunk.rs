use async_trait::async_trait;
use react_core::tools::{Tool, ToolError, ToolResult};
use serde_json::json;

use super::{optional_int, split_lines};
use crate::sandbox::SharedSandbox;

const DEFAULT_START_LINE: i64 = 1;
const DEFAULT_MAX_LINES: i64 = 50;
const MAX_LINES_LIMIT: i64 = 100;

/// Tool for reading a numbered window of lines from a sandbox file
pub struct ReadFileChunkTool {
    sandbox: SharedSandbox,
}

impl ReadFileChunkTool {
    pub fn new(sandbox: SharedSandbox) -> Self {
        Self { sandbox }
    }

    fn validate(start_line: i64, max_lines: i64) -> Result<(), ToolError> {
        if start_line < 1 {
            return Err(ToolError::InvalidArguments(
                "start_line must be >= 1".to_string(),
            ));
        }
        if max_lines < 1 {
            return Err(ToolError::InvalidArguments(
                "max_lines must be >= 1".to_string(),
            ));
        }
        if max_lines > MAX_LINES_LIMIT {
            return Err(ToolError::InvalidArguments(format!(
                "max_lines cannot exceed {MAX_LINES_LIMIT}"
            )));
        }
        Ok(())
    }

    /// Render lines `start_line..=min(start_line + max_lines - 1, total)` with a summary header.
    pub fn format_chunk(content: &str, start_line: usize, max_lines: usize) -> String {
        let lines = split_lines(content);
        let total_lines = lines.len();
        let end_line = (start_line + max_lines - 1).min(total_lines);

        let numbered = if start_line <= end_line {
            lines[start_line - 1..end_line]
                .iter()
                .enumerate()
                .map(|(offset, line)| format!("{}: {}", start_line + offset, line))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            String::new()
        };

        format!(
            "File has {total_lines} total lines. Showing lines {start_line} to {end_line}.\n\n{numbered}"
        )
    }
}

#[async_trait]
impl Tool for ReadFileChunkTool {
    fn name(&self) -> &str {
        "read_file_chunk"
    }

    fn description(&self) -> &str {
        "Read a chunk of lines from a file. Lines are numbered from 1; at most 100 lines are returned per call"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path to the file to read"
                },
                "start_line": {
                    "type": "integer",
                    "description": "Line number to start reading from (1-indexed)",
                    "default": DEFAULT_START_LINE
                },
                "max_lines": {
                    "type": "integer",
                    "description": "Maximum number of lines to read (default: 50, max: 100)",
                    "default": DEFAULT_MAX_LINES
                }
            },
            "required": ["file"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file = args["file"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file' parameter".to_string()))?;
        let start_line = optional_int(&args, "start_line", DEFAULT_START_LINE)?;
        let max_lines = optional_int(&args, "max_lines", DEFAULT_MAX_LINES)?;

        Self::validate(start_line, max_lines)?;

        let content = self.sandbox.read_file(file).await?;

        Ok(ToolResult::ok(Self::format_chunk(
            &content,
            start_line as usize,
            max_lines as usize,
        )))
    }
}
