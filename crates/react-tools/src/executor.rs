use async_trait::async_trait;
use react_core::tools::{
    execute_tool_call, Tool, ToolCall, ToolError, ToolExecutor, ToolRegistry, ToolResult,
    ToolSchema,
};

use crate::sandbox::SharedSandbox;
use crate::tools::{ReadFileChunkTool, SearchFileTool, SubmitTool};

/// List of all built-in tool names
pub const BUILTIN_TOOL_NAMES: [&str; 3] = ["read_file_chunk", "search_file", "submit"];

/// Built-in tool executor that uses ToolRegistry for dynamic dispatch
pub struct BuiltinToolExecutor {
    registry: ToolRegistry,
}

impl BuiltinToolExecutor {
    /// Creates a new executor with all built-in tools bound to `sandbox`
    pub fn new(sandbox: SharedSandbox) -> Self {
        let registry = ToolRegistry::new();
        Self::register_builtin_tools(&registry, sandbox);
        Self { registry }
    }

    fn register_builtin_tools(registry: &ToolRegistry, sandbox: SharedSandbox) {
        let _ = registry.register(ReadFileChunkTool::new(sandbox.clone()));
        let _ = registry.register(SearchFileTool::new(sandbox));
        let _ = registry.register(SubmitTool::new());
    }

    /// Runs a call and folds any failure into an `"Error: ..."` result.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        execute_tool_call(call, self).await
    }
}

#[async_trait]
impl ToolExecutor for BuiltinToolExecutor {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        self.registry.dispatch(call).await
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        self.registry.list_tools()
    }
}

/// Builder for constructing a BuiltinToolExecutor with custom tool configurations
pub struct BuiltinToolExecutorBuilder {
    registry: ToolRegistry,
}

impl BuiltinToolExecutorBuilder {
    /// Creates a new builder with no tools registered
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    /// Registers a custom tool
    pub fn with_tool<T: Tool + 'static>(self, tool: T) -> Result<Self, ToolError> {
        self.registry
            .register(tool)
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(self)
    }

    pub fn build(self) -> BuiltinToolExecutor {
        BuiltinToolExecutor {
            registry: self.registry,
        }
    }
}

impl Default for BuiltinToolExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::sandbox::LocalSandbox;

    fn make_tool_call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall::new("call_1", name, args.to_string())
    }

    fn sandbox_with(files: &[(&str, &str)]) -> (tempfile::TempDir, SharedSandbox) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        let sandbox: SharedSandbox = Arc::new(LocalSandbox::new(dir.path()));
        (dir, sandbox)
    }

    #[test]
    fn test_executor_has_all_builtin_tools() {
        let (_dir, sandbox) = sandbox_with(&[]);
        let executor = BuiltinToolExecutor::new(sandbox);
        let tools = executor.list_tools();

        assert_eq!(tools.len(), BUILTIN_TOOL_NAMES.len());

        let tool_names: Vec<String> = tools.iter().map(|t| t.function.name.clone()).collect();
        for tool_name in BUILTIN_TOOL_NAMES {
            assert!(tool_names.contains(&tool_name.to_string()));
        }
    }

    #[test]
    fn test_executor_builder_empty() {
        let executor = BuiltinToolExecutorBuilder::new().build();
        assert!(executor.list_tools().is_empty());
    }

    #[test]
    fn test_executor_builder_rejects_duplicate_tool() {
        let result = BuiltinToolExecutorBuilder::new()
            .with_tool(SubmitTool::new())
            .and_then(|builder| builder.with_tool(SubmitTool::new()));

        assert!(matches!(result, Err(ToolError::Execution(_))));
    }

    #[tokio::test]
    async fn test_execute_dispatches_to_sandbox_tool() {
        let (_dir, sandbox) = sandbox_with(&[("notes.txt", "first\nsecond\n")]);
        let executor = BuiltinToolExecutor::new(sandbox);

        let result = executor
            .execute(&make_tool_call(
                "read_file_chunk",
                json!({"file": "notes.txt", "max_lines": 1}),
            ))
            .await
            .unwrap();

        assert_eq!(
            result.result,
            "File has 2 total lines. Showing lines 1 to 1.\n\n1: first"
        );
    }

    #[tokio::test]
    async fn test_invoke_folds_unknown_tool_into_error_result() {
        let (_dir, sandbox) = sandbox_with(&[]);
        let executor = BuiltinToolExecutor::new(sandbox);

        let result = executor
            .invoke(&make_tool_call("does_not_exist", json!({})))
            .await;

        assert!(!result.success);
        assert_eq!(result.result, "Error: Tool 'does_not_exist' not found");
    }

    #[tokio::test]
    async fn test_invoke_folds_malformed_arguments() {
        let (_dir, sandbox) = sandbox_with(&[]);
        let executor = BuiltinToolExecutor::new(sandbox);
        let call = ToolCall::new("call_1", "search_file", "{not json");

        let result = executor.invoke(&call).await;

        assert!(!result.success);
        assert!(result.result.starts_with("Error: Invalid arguments:"));
    }

    #[tokio::test]
    async fn test_invoke_folds_validation_error_without_reading() {
        let (_dir, sandbox) = sandbox_with(&[]);
        let executor = BuiltinToolExecutor::new(sandbox);

        let result = executor
            .invoke(&make_tool_call(
                "read_file_chunk",
                json!({"file": "missing.txt", "max_lines": 150}),
            ))
            .await;

        assert_eq!(
            result.result,
            "Error: Invalid arguments: max_lines cannot exceed 100"
        );
    }
}
