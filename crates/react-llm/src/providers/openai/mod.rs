use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::provider::{LLMError, LLMProvider, Result};
use crate::types::{CacheSetting, GenerationResult};
use react_core::{tools::ToolSchema, Message};

use super::common::openai_compat::{
    build_openai_compat_body, is_context_length_error, parse_openai_compat_response,
};

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: Option<u32>,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_output_tokens: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        _cache: &CacheSetting,
    ) -> Result<GenerationResult> {
        let body = build_openai_compat_body(&self.model, messages, tools, self.max_output_tokens);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status == StatusCode::BAD_REQUEST && is_context_length_error(&text) {
            log::debug!(
                "OpenAI provider: prompt exceeded context window for model '{}'",
                self.model
            );
            return Ok(GenerationResult::truncated(String::new()));
        }

        if !status.is_success() {
            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        parse_openai_compat_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
