use async_trait::async_trait;
use react_core::{tools::ToolSchema, Message};
use thiserror::Error;

use crate::types::{CacheSetting, GenerationResult};

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Produce one assistant turn for the given conversation.
    ///
    /// Implementations must report [`crate::StopReason::ModelLength`] when the
    /// conversation no longer fits the model's context window instead of
    /// returning an error, so the caller can trim and retry.
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        cache: &CacheSetting,
    ) -> Result<GenerationResult>;

    /// Identifier of the model behind this provider
    fn model_name(&self) -> &str;
}
