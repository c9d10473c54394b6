use std::fmt;

use react_core::{AgentError, BudgetExceeded, BudgetTracker, Conversation, Score};
use serde::Serialize;

/// Mutable state of one episode. Owned by the caller and borrowed by the loop.
#[derive(Debug, Clone)]
pub struct EpisodeState {
    pub conversation: Conversation,
    pub budget: BudgetTracker,
    /// Submissions that have been scored
    pub attempts: usize,
    pub scores: Vec<Score>,
    /// Most recent submitted answer
    pub answer: Option<String>,
}

impl EpisodeState {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            conversation,
            budget: BudgetTracker::default(),
            attempts: 0,
            scores: Vec::new(),
            answer: None,
        }
    }

    /// Start an episode from a single user prompt.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self::new(Conversation::with_prompt(
            uuid::Uuid::new_v4().to_string(),
            prompt,
        ))
    }

    /// Task-level message limit, used when the loop configuration sets none.
    pub fn with_message_limit(mut self, limit: usize) -> Self {
        self.budget.message_limit = Some(limit);
        self
    }

    /// Task-level token limit, used when the loop configuration sets none.
    pub fn with_token_limit(mut self, limit: u64) -> Self {
        self.budget.token_limit = Some(limit);
        self
    }

    pub fn id(&self) -> &str {
        &self.conversation.id
    }

    pub fn message_count(&self) -> usize {
        self.conversation.len()
    }

    /// Which budget, if any, has run out.
    pub fn completed(&self) -> Option<BudgetExceeded> {
        self.budget.exceeded(self.message_count())
    }

    pub fn last_score(&self) -> Option<&Score> {
        self.scores.last()
    }

    pub fn outcome(&self, termination: Termination) -> EpisodeOutcome {
        EpisodeOutcome {
            termination,
            attempts: self.attempts,
            last_score: self.last_score().cloned(),
            answer: self.answer.clone(),
            message_count: self.message_count(),
            tokens_used: self.budget.tokens_used(),
        }
    }
}

/// Why an episode stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    Success,
    AttemptsExhausted,
    MessageLimit,
    TokenLimit,
    Cancelled,
    Fatal(AgentError),
}

impl Termination {
    pub fn is_success(&self) -> bool {
        matches!(self, Termination::Success)
    }

    pub fn is_budget_exhausted(&self) -> bool {
        matches!(self, Termination::MessageLimit | Termination::TokenLimit)
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Termination::Fatal(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Termination::Success => "success",
            Termination::AttemptsExhausted => "attempts_exhausted",
            Termination::MessageLimit => "message_limit",
            Termination::TokenLimit => "token_limit",
            Termination::Cancelled => "cancelled",
            Termination::Fatal(_) => "fatal",
        }
    }
}

impl From<BudgetExceeded> for Termination {
    fn from(exceeded: BudgetExceeded) -> Self {
        match exceeded {
            BudgetExceeded::Messages => Termination::MessageLimit,
            BudgetExceeded::Tokens => Termination::TokenLimit,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Fatal(error) => write!(f, "fatal: {error}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Summary returned when an episode ends. The conversation stays in [`EpisodeState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeOutcome {
    #[serde(serialize_with = "serialize_termination")]
    pub termination: Termination,
    pub attempts: usize,
    pub last_score: Option<Score>,
    pub answer: Option<String>,
    pub message_count: usize,
    pub tokens_used: u64,
}

fn serialize_termination<S>(termination: &Termination, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(termination)
}
