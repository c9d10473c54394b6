//! Message and token ceilings for a single episode.

use serde::{Deserialize, Serialize};

use crate::agent::TokenUsage;

/// Message limit used when neither the loop nor the task configures one.
pub const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// Which ceiling ended the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetExceeded {
    Messages,
    Tokens,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetTracker {
    /// Ceiling on conversation length, system messages included
    pub message_limit: Option<usize>,
    /// Ceiling on total tokens consumed across all generations
    pub token_limit: Option<u64>,
    /// Accumulated usage reported by the model
    pub usage: TokenUsage,
}

impl BudgetTracker {
    pub fn new(message_limit: Option<usize>, token_limit: Option<u64>) -> Self {
        Self {
            message_limit,
            token_limit,
            usage: TokenUsage::default(),
        }
    }

    /// Apply loop-level limits over task-level ones, falling back to
    /// [`DEFAULT_MESSAGE_LIMIT`] when no message limit is set anywhere.
    pub fn resolve_limits(&mut self, message_limit: Option<usize>, token_limit: Option<u64>) {
        self.message_limit = Some(
            message_limit
                .or(self.message_limit)
                .unwrap_or(DEFAULT_MESSAGE_LIMIT),
        );
        self.token_limit = token_limit.or(self.token_limit);
    }

    pub fn record_usage(&mut self, usage: &TokenUsage) {
        self.usage.accumulate(usage);
    }

    pub fn tokens_used(&self) -> u64 {
        self.usage.total_tokens
    }

    /// Report the first ceiling met or exceeded for a conversation of `message_count` messages.
    pub fn exceeded(&self, message_count: usize) -> Option<BudgetExceeded> {
        if self
            .message_limit
            .is_some_and(|limit| message_count >= limit)
        {
            return Some(BudgetExceeded::Messages);
        }

        if self
            .token_limit
            .is_some_and(|limit| self.tokens_used() >= limit)
        {
            return Some(BudgetExceeded::Tokens);
        }

        None
    }
}
