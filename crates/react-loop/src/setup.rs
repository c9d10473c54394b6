use async_trait::async_trait;
use react_core::{AgentError, Conversation};

/// A step run once against the conversation before the first generation.
#[async_trait]
pub trait SetupStep: Send + Sync {
    async fn apply(&self, conversation: &mut Conversation) -> Result<(), AgentError>;
}

/// Adds a system message after any system messages already present.
pub struct SystemMessage {
    content: String,
}

impl SystemMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl SetupStep for SystemMessage {
    async fn apply(&self, conversation: &mut Conversation) -> Result<(), AgentError> {
        if self.content.trim().is_empty() {
            return Err(AgentError::Setup("system message is empty".to_string()));
        }
        conversation.insert_system_message(self.content.clone());
        Ok(())
    }
}
