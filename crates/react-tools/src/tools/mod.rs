mod read_file_chunk;
mod search_file;
mod submit;

use react_core::tools::ToolError;
use serde_json::Value;

pub use read_file_chunk::ReadFileChunkTool;
pub use search_file::SearchFileTool;
pub use submit::{SubmitTool, SUBMIT_TOOL_NAME};

/// Read an optional integer argument, rejecting values outside the `i64` range.
fn optional_int(args: &Value, key: &str, default: i64) -> Result<i64, ToolError> {
    match &args[key] {
        Value::Null => Ok(default),
        value => value
            .as_i64()
            .ok_or_else(|| ToolError::InvalidArguments(format!("{key} must be an integer"))),
    }
}

/// Split on `\n`, `\r\n` and a lone `\r`. A trailing terminator does not start a new line.
fn split_lines(content: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = content;

    while !rest.is_empty() {
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(index) => {
                lines.push(&rest[..index]);
                let terminator = if rest[index..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[index + terminator..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}
