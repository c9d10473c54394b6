use async_trait::async_trait;
use react_core::tools::{Tool, ToolError, ToolResult};
use serde_json::json;

use super::{optional_int, split_lines};
use crate::sandbox::SharedSandbox;

const DEFAULT_CONTEXT_LINES: i64 = 2;

/// Case-insensitive substring search with surrounding context
pub struct SearchFileTool {
    sandbox: SharedSandbox,
}

impl SearchFileTool {
    pub fn new(sandbox: SharedSandbox) -> Self {
        Self { sandbox }
    }

    pub fn search(content: &str, file: &str, query: &str, context_lines: usize) -> String {
        let lines = split_lines(content);
        let needle = query.to_lowercase();

        let blocks: Vec<String> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.to_lowercase().contains(&needle))
            .map(|(index, _)| {
                let start = index.saturating_sub(context_lines);
                let end = (index + context_lines + 1).min(lines.len());
                (start..end)
                    .map(|i| {
                        let prefix = if i == index { ">>> " } else { "    " };
                        format!("{}{}: {}", prefix, i + 1, lines[i])
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect();

        if blocks.is_empty() {
            return format!("No matches found for '{query}' in {file}.");
        }

        format!(
            "Found {} matches for '{}' in {}:\n\n{}",
            blocks.len(),
            query,
            file,
            blocks.join("\n\n")
        )
    }
}

#[async_trait]
impl Tool for SearchFileTool {
    fn name(&self) -> &str {
        "search_file"
    }

    fn description(&self) -> &str {
        "Search for a case-insensitive substring in a file and return each match with surrounding context lines"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path to the file to search"
                },
                "query": {
                    "type": "string",
                    "description": "Text to search for (case-insensitive)"
                },
                "context_lines": {
                    "type": "integer",
                    "description": "Number of lines of context to show before and after each match",
                    "default": DEFAULT_CONTEXT_LINES
                }
            },
            "required": ["file", "query"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let file = args["file"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'file' parameter".to_string()))?;
        let query = args["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' parameter".to_string()))?;
        let context_lines = optional_int(&args, "context_lines", DEFAULT_CONTEXT_LINES)?;

        if context_lines < 0 {
            return Err(ToolError::InvalidArguments(
                "context_lines must be >= 0".to_string(),
            ));
        }

        let content = self.sandbox.read_file(file).await?;
        log::debug!(
            "search_file: '{}' in {} ({} bytes)",
            query,
            file,
            content.len()
        );

        Ok(ToolResult::ok(Self::search(
            &content,
            file,
            query,
            context_lines as usize,
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sandbox::LocalSandbox;

    fn tool_for(dir: &tempfile::TempDir) -> SearchFileTool {
        SearchFileTool::new(Arc::new(LocalSandbox::new(dir.path())))
    }

    #[tokio::test]
    async fn test_match_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log.txt"), "start\nerror occurred\nend\n").unwrap();

        let result = tool_for(&dir)
            .execute(json!({"file": "log.txt", "query": "ERROR", "context_lines": 0}))
            .await
            .unwrap();

        assert_eq!(
            result.result,
            "Found 1 matches for 'ERROR' in log.txt:\n\n>>> 2: error occurred"
        );
    }

    #[tokio::test]
    async fn test_context_window_is_clamped_at_file_edges() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "needle\nb\nc\nd\nneedle").unwrap();

        let result = tool_for(&dir)
            .execute(json!({"file": "a.txt", "query": "needle", "context_lines": 1}))
            .await
            .unwrap();

        assert_eq!(
            result.result,
            "Found 2 matches for 'needle' in a.txt:\n\n>>> 1: needle\n    2: b\n\n    4: d\n>>> 5: needle"
        );
    }

    #[tokio::test]
    async fn test_no_matches_message() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha\nbeta\n").unwrap();

        let result = tool_for(&dir)
            .execute(json!({"file": "a.txt", "query": "gamma"}))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.result, "No matches found for 'gamma' in a.txt.");
    }

    #[tokio::test]
    async fn test_negative_context_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let error = tool_for(&dir)
            .execute(json!({"file": "a.txt", "query": "x", "context_lines": -1}))
            .await
            .unwrap_err();

        assert!(matches!(error, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_context_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "x\n").unwrap();

        let error = tool_for(&dir)
            .execute(json!({"file": "a.txt", "query": "x", "context_lines": u64::MAX}))
            .await
            .unwrap_err();

        assert_eq!(
            error,
            ToolError::InvalidArguments("context_lines must be an integer".to_string())
        );
    }

    #[tokio::test]
    async fn test_carriage_return_files_match_per_line() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mac.txt"), "alpha\rneedle\rgamma\r").unwrap();

        let result = tool_for(&dir)
            .execute(json!({"file": "mac.txt", "query": "needle", "context_lines": 0}))
            .await
            .unwrap();

        assert_eq!(
            result.result,
            "Found 1 matches for 'needle' in mac.txt:\n\n>>> 2: needle"
        );
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let error = tool_for(&dir)
            .execute(json!({"file": "missing.txt", "query": "x"}))
            .await
            .unwrap_err();

        assert_eq!(error, ToolError::NotFound("File 'missing.txt' not found".to_string()));
    }
}
