use crate::tools::ToolCall;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(
        default = "generate_id",
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn assistant(content: impl Into<String>, tool_calls: Option<Vec<ToolCall>>) -> Self {
        Self {
            tool_calls: tool_calls.filter(|calls| !calls.is_empty()),
            ..Self::with_role(Role::Assistant, content)
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self.role, Role::System)
    }

    /// Tool calls requested by an assistant message, empty for every other role.
    pub fn requested_tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }
}

/// Ordered message history for a single episode.
///
/// Messages are only appended, except through [`Conversation::remove_message`]
/// which the overflow recovery uses to drop the oldest non-system entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Model name used to drive this conversation (e.g., "gpt-4o")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            model: None,
        }
    }

    /// Start a conversation from a single user prompt.
    pub fn with_prompt(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        let mut conversation = Self::new(id);
        conversation.add_message(Message::user(prompt));
        conversation
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    pub fn extend_messages(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
        self.updated_at = Utc::now();
    }

    /// Insert a system message after any existing leading system messages.
    pub fn insert_system_message(&mut self, content: impl Into<String>) {
        let position = self
            .messages
            .iter()
            .position(|message| !message.is_system())
            .unwrap_or(self.messages.len());
        self.messages.insert(position, Message::system(content));
        self.updated_at = Utc::now();
    }

    pub fn remove_message(&mut self, index: usize) -> Option<Message> {
        if index >= self.messages.len() {
            return None;
        }
        self.updated_at = Utc::now();
        Some(self.messages.remove(index))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn non_system_count(&self) -> usize {
        self.messages.iter().filter(|message| !message.is_system()).count()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}
