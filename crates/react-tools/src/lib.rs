//! Built-in tools for reading files inside a sandbox and submitting answers.
//!
//! Tools implement `react_core::Tool` and are dispatched by name through the
//! [`BuiltinToolExecutor`].

mod executor;
pub mod sandbox;
pub mod tools;

pub use executor::{BuiltinToolExecutor, BuiltinToolExecutorBuilder, BUILTIN_TOOL_NAMES};
pub use sandbox::{LocalSandbox, SandboxEnvironment, SandboxError, SharedSandbox};
pub use tools::{ReadFileChunkTool, SearchFileTool, SubmitTool, SUBMIT_TOOL_NAME};
