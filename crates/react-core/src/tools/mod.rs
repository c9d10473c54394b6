pub mod executor;
pub mod registry;
pub mod types;
pub mod validation;

pub use executor::{execute_tool_call, parse_tool_args, ToolError, ToolExecutor};
pub use registry::{normalize_tool_name, RegistryError, SharedTool, Tool, ToolRegistry};
pub use types::{FunctionCall, FunctionSchema, ToolCall, ToolResult, ToolSchema};
pub use validation::validate_arguments;
