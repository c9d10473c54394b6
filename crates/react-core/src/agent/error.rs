use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Context overflow: {0}")]
    ContextOverflow(String),

    #[error("Setup error: {0}")]
    Setup(String),

    #[error("Cancelled")]
    Cancelled,
}
