pub mod agent;
pub mod budget;
pub mod score;
pub mod tools;

pub use agent::events::{AgentEvent, TokenUsage};
pub use agent::types::{Conversation, Message, Role};
pub use agent::AgentError;
pub use budget::{BudgetExceeded, BudgetTracker};
pub use score::{value_to_float, Score, ScoreValue, ValueToFloat};
pub use tools::{
    execute_tool_call, parse_tool_args, FunctionCall, Tool, ToolCall, ToolError, ToolExecutor,
    ToolRegistry, ToolResult, ToolSchema,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
