//! Recovery for generations truncated by the model's context window.
//!
//! System messages are pinned. Each call drops exactly one message: the
//! oldest non-system entry.

use crate::agent::{Conversation, Message};

/// Fewest non-system messages a conversation must hold before trimming proceeds.
pub const MIN_TRIMMABLE_MESSAGES: usize = 2;

#[derive(Debug)]
pub enum TrimOutcome {
    Removed(Message),
    /// Nothing left to trim without emptying the conversation
    Exhausted { non_system_messages: usize },
}

pub fn trim_oldest_non_system(conversation: &mut Conversation) -> TrimOutcome {
    let non_system_messages = conversation.non_system_count();
    if non_system_messages < MIN_TRIMMABLE_MESSAGES {
        return TrimOutcome::Exhausted {
            non_system_messages,
        };
    }

    let index = conversation
        .messages
        .iter()
        .position(|message| !message.is_system());

    match index.and_then(|index| conversation.remove_message(index)) {
        Some(removed) => TrimOutcome::Removed(removed),
        None => TrimOutcome::Exhausted {
            non_system_messages,
        },
    }
}
