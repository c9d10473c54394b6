use async_trait::async_trait;
use react_core::score::{CORRECT, INCORRECT};
use react_core::{Score, ScoreValue};

use super::{Scorer, ScorerError};
use crate::state::EpisodeState;

fn graded(correct: bool, answer: &str, explanation: String) -> Score {
    let grade = if correct { CORRECT } else { INCORRECT };
    Score::new(ScoreValue::Text(grade.to_string()))
        .with_answer(answer)
        .with_explanation(explanation)
}

/// Correct when the answer contains the target text.
pub struct IncludesScorer {
    target: String,
    ignore_case: bool,
}

impl IncludesScorer {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ignore_case: true,
        }
    }

    pub fn case_sensitive(mut self) -> Self {
        self.ignore_case = false;
        self
    }
}

#[async_trait]
impl Scorer for IncludesScorer {
    async fn score(&self, _state: &EpisodeState, answer: &str) -> Result<Score, ScorerError> {
        if self.target.is_empty() {
            return Err(ScorerError("scoring target is empty".to_string()));
        }

        let found = if self.ignore_case {
            answer.to_lowercase().contains(&self.target.to_lowercase())
        } else {
            answer.contains(&self.target)
        };

        Ok(graded(
            found,
            answer,
            format!("Looked for '{}' in the submitted answer", self.target),
        ))
    }
}

/// Correct when the trimmed answer equals the trimmed target.
pub struct ExactScorer {
    target: String,
}

impl ExactScorer {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

#[async_trait]
impl Scorer for ExactScorer {
    async fn score(&self, _state: &EpisodeState, answer: &str) -> Result<Score, ScorerError> {
        Ok(graded(
            answer.trim() == self.target.trim(),
            answer,
            format!("Expected exactly '{}'", self.target.trim()),
        ))
    }
}
