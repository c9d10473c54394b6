//! Attempt accounting and verdicts for submitted answers.

mod builtin;

pub use builtin::{ExactScorer, IncludesScorer};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use react_core::{AgentError, AgentEvent, Message, Score};

use crate::config::AgentLoopConfig;
use crate::state::EpisodeState;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ScorerError(pub String);

/// Judges a submitted answer against the task.
#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, state: &EpisodeState, answer: &str) -> Result<Score, ScorerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    /// Incorrect, and no attempts remain
    Exhausted,
    /// Incorrect; the corrective message has been appended
    Retry,
}

/// Score one submission and decide what the loop does next.
pub async fn evaluate_submission(
    state: &mut EpisodeState,
    answer: String,
    scorer: &dyn Scorer,
    config: &AgentLoopConfig,
    event_tx: &mpsc::Sender<AgentEvent>,
) -> Result<Verdict, AgentError> {
    let score = scorer
        .score(state, &answer)
        .await
        .map_err(|error| AgentError::Scoring(error.to_string()))?;
    let value = (config.score_value)(&score.value);

    state.attempts += 1;
    state.answer = Some(answer);
    state.scores.push(score.clone());

    log::info!(
        "[{}] Attempt {}/{} scored {} ({})",
        state.id(),
        state.attempts,
        config.max_attempts,
        score.value,
        value
    );
    let _ = event_tx
        .send(AgentEvent::Scored {
            attempt: state.attempts,
            score,
            value,
        })
        .await;

    if value >= config.correct_threshold {
        return Ok(Verdict::Correct);
    }

    if state.attempts >= config.max_attempts {
        return Ok(Verdict::Exhausted);
    }

    let reply = config.incorrect_message.resolve(state, &state.scores);
    state.conversation.add_message(Message::user(reply));
    Ok(Verdict::Retry)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::MessageSource;
    use react_core::{Role, ScoreValue};

    struct FixedScorer {
        value: ScoreValue,
        calls: AtomicUsize,
    }

    impl FixedScorer {
        fn new(value: ScoreValue) -> Self {
            Self {
                value,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Scorer for FixedScorer {
        async fn score(&self, _state: &EpisodeState, answer: &str) -> Result<Score, ScorerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Score::new(self.value.clone()).with_answer(answer))
        }
    }

    struct FailingScorer;

    #[async_trait]
    impl Scorer for FailingScorer {
        async fn score(&self, _state: &EpisodeState, _answer: &str) -> Result<Score, ScorerError> {
            Err(ScorerError("grader offline".to_string()))
        }
    }

    fn config(max_attempts: usize) -> AgentLoopConfig {
        AgentLoopConfig {
            max_attempts,
            ..AgentLoopConfig::default()
        }
    }

    #[tokio::test]
    async fn correct_answer_counts_one_attempt() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);
        let scorer = FixedScorer::new(ScoreValue::Text("C".to_string()));

        let verdict = evaluate_submission(&mut state, "42".to_string(), &scorer, &config(3), &event_tx)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Correct);
        assert_eq!(state.attempts, 1);
        assert_eq!(state.answer.as_deref(), Some("42"));
        assert_eq!(state.message_count(), 1);
    }

    #[tokio::test]
    async fn single_attempt_incorrect_is_terminal_without_reply() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);
        let scorer = FixedScorer::new(ScoreValue::Text("I".to_string()));

        let verdict = evaluate_submission(&mut state, "41".to_string(), &scorer, &config(1), &event_tx)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Exhausted);
        assert_eq!(state.message_count(), 1);
    }

    #[tokio::test]
    async fn incorrect_with_attempts_left_appends_reply() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);
        let scorer = FixedScorer::new(ScoreValue::Float(0.5));

        let verdict = evaluate_submission(&mut state, "41".to_string(), &scorer, &config(2), &event_tx)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Retry);
        let reply = state.conversation.last_message().unwrap();
        assert_eq!(reply.role, Role::User);
        assert_eq!(reply.content, crate::config::DEFAULT_INCORRECT_MESSAGE);
    }

    #[tokio::test]
    async fn computed_reply_sees_score_history() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);
        let scorer = FixedScorer::new(ScoreValue::Bool(false));
        let config = AgentLoopConfig {
            max_attempts: 5,
            incorrect_message: MessageSource::computed(|state, scores| {
                format!("Attempt {} of {} failed", scores.len(), state.attempts)
            }),
            ..AgentLoopConfig::default()
        };

        evaluate_submission(&mut state, "a".to_string(), &scorer, &config, &event_tx)
            .await
            .unwrap();
        evaluate_submission(&mut state, "b".to_string(), &scorer, &config, &event_tx)
            .await
            .unwrap();

        assert_eq!(
            state.conversation.last_message().unwrap().content,
            "Attempt 2 of 2 failed"
        );
    }

    #[tokio::test]
    async fn scorer_failure_is_fatal_and_not_counted() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);

        let error = evaluate_submission(
            &mut state,
            "42".to_string(),
            &FailingScorer,
            &config(3),
            &event_tx,
        )
        .await
        .unwrap_err();

        assert_eq!(error, AgentError::Scoring("grader offline".to_string()));
        assert_eq!(state.attempts, 0);
    }

    #[tokio::test]
    async fn custom_threshold_accepts_partial_credit() {
        let mut state = EpisodeState::from_prompt("task");
        let (event_tx, _event_rx) = mpsc::channel(8);
        let scorer = FixedScorer::new(ScoreValue::Text("P".to_string()));
        let config = AgentLoopConfig {
            correct_threshold: 0.5,
            ..AgentLoopConfig::default()
        };

        let verdict = evaluate_submission(&mut state, "close".to_string(), &scorer, &config, &event_tx)
            .await
            .unwrap();

        assert_eq!(verdict, Verdict::Correct);
        assert_eq!(scorer.calls.load(Ordering::SeqCst), 1);
    }
}
