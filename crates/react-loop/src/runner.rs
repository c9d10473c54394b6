use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use react_core::budget::{trim_oldest_non_system, TrimOutcome};
use react_core::tools::{ToolCall, ToolExecutor};
use react_core::{AgentError, AgentEvent};
use react_llm::LLMProvider;

use crate::config::AgentLoopConfig;
use crate::scoring::{evaluate_submission, Scorer, Verdict};
use crate::state::{EpisodeOutcome, EpisodeState, Termination};
use crate::turn::{dispatch_tool_calls, generate_turn, TurnOutcome};

/// Where the loop is between two transitions.
#[derive(Debug)]
enum LoopPhase {
    Generating,
    DispatchingTools(Vec<ToolCall>),
    RecoveringOverflow,
    Scoring(String),
    Terminated(Termination),
}

/// Drive one episode until a terminal condition fires.
///
/// Never returns an error: model, scorer and setup failures as well as
/// unrecoverable context overflow end up as [`Termination::Fatal`].
pub async fn run_agent_loop_with_config(
    state: &mut EpisodeState,
    event_tx: mpsc::Sender<AgentEvent>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolExecutor>,
    scorer: Arc<dyn Scorer>,
    cancel_token: CancellationToken,
    config: AgentLoopConfig,
) -> EpisodeOutcome {
    let debug_logger = DebugLogger::new(log::log_enabled!(log::Level::Debug));
    let episode_id = state.id().to_string();

    state
        .budget
        .resolve_limits(config.message_limit, config.token_limit);
    state.conversation.model = Some(llm.model_name().to_string());

    debug_logger.log_event(
        &episode_id,
        "agent_loop_start",
        serde_json::json!({
            "model": llm.model_name(),
            "message_limit": state.budget.message_limit,
            "token_limit": state.budget.token_limit,
            "max_attempts": config.max_attempts,
            "initial_message_count": state.message_count(),
        }),
    );

    let mut phase = match apply_setup(state, &config).await {
        Ok(()) => LoopPhase::Generating,
        Err(error) => LoopPhase::Terminated(Termination::Fatal(error)),
    };

    let tool_schemas = tools.list_tools();
    let mut turn = 0usize;
    let mut consecutive_overflows = 0usize;
    let mut overflow_allowance = 0usize;

    let termination = loop {
        phase = match phase {
            LoopPhase::Generating => {
                if let Some(exceeded) = state.completed() {
                    log::info!(
                        "[{}] Budget exhausted ({:?}) after {} messages and {} tokens",
                        episode_id,
                        exceeded,
                        state.message_count(),
                        state.budget.tokens_used()
                    );
                    LoopPhase::Terminated(exceeded.into())
                } else if cancel_token.is_cancelled() {
                    LoopPhase::Terminated(Termination::Cancelled)
                } else {
                    turn += 1;
                    debug_logger.log_event(
                        &episode_id,
                        "turn_start",
                        serde_json::json!({
                            "turn": turn,
                            "message_count": state.message_count(),
                            "tokens_used": state.budget.tokens_used(),
                        }),
                    );
                    let _ = event_tx
                        .send(AgentEvent::TurnStart {
                            turn,
                            message_count: state.message_count(),
                        })
                        .await;

                    let timer = Timer::new("llm_request");
                    let generated = tokio::select! {
                        biased;
                        _ = cancel_token.cancelled() => Err(AgentError::Cancelled),
                        result = generate_turn(state, llm.as_ref(), &tool_schemas, &config, &event_tx) => result,
                    };
                    timer.debug(&episode_id);

                    match generated {
                        Ok(TurnOutcome::Truncated) => LoopPhase::RecoveringOverflow,
                        Ok(TurnOutcome::ToolCalls(calls)) => {
                            consecutive_overflows = 0;
                            LoopPhase::DispatchingTools(calls)
                        }
                        Ok(TurnOutcome::Continued) => {
                            consecutive_overflows = 0;
                            log::debug!("[{}] No tool calls, nudged model to continue", episode_id);
                            LoopPhase::Generating
                        }
                        Err(AgentError::Cancelled) => LoopPhase::Terminated(Termination::Cancelled),
                        Err(error) => {
                            log::error!("[{}] Generation failed: {}", episode_id, error);
                            LoopPhase::Terminated(Termination::Fatal(error))
                        }
                    }
                }
            }

            LoopPhase::RecoveringOverflow => {
                // A run of overflows may trim at most the messages present when it began.
                if consecutive_overflows == 0 {
                    overflow_allowance = state.conversation.non_system_count();
                }
                consecutive_overflows += 1;
                if consecutive_overflows > overflow_allowance {
                    LoopPhase::Terminated(Termination::Fatal(AgentError::ContextOverflow(
                        format!(
                            "{consecutive_overflows} consecutive truncated generations, every earlier message already trimmed"
                        ),
                    )))
                } else {
                    match trim_oldest_non_system(&mut state.conversation) {
                        TrimOutcome::Removed(removed) => {
                            log::warn!(
                                "[{}] Context overflow, dropped oldest {:?} message ({} remain)",
                                episode_id,
                                removed.role,
                                state.message_count()
                            );
                            let _ = event_tx
                                .send(AgentEvent::ContextTrimmed {
                                    removed_message_id: removed.id,
                                    remaining_messages: state.message_count(),
                                })
                                .await;
                            LoopPhase::Generating
                        }
                        TrimOutcome::Exhausted {
                            non_system_messages,
                        } => LoopPhase::Terminated(Termination::Fatal(
                            AgentError::ContextOverflow(format!(
                                "cannot trim further with {non_system_messages} non-system messages left"
                            )),
                        )),
                    }
                }
            }

            LoopPhase::DispatchingTools(calls) => {
                let timer = Timer::new(format!("tools_x{}", calls.len()));
                let dispatched =
                    dispatch_tool_calls(state, tools.as_ref(), calls, &event_tx).await;
                timer.debug(&episode_id);

                match config.submission.detect(&dispatched) {
                    Some(answer) => LoopPhase::Scoring(answer),
                    None => LoopPhase::Generating,
                }
            }

            LoopPhase::Scoring(answer) => {
                match evaluate_submission(state, answer, scorer.as_ref(), &config, &event_tx).await
                {
                    Ok(Verdict::Correct) => LoopPhase::Terminated(Termination::Success),
                    Ok(Verdict::Exhausted) => {
                        LoopPhase::Terminated(Termination::AttemptsExhausted)
                    }
                    Ok(Verdict::Retry) => LoopPhase::Generating,
                    Err(error) => {
                        log::error!("[{}] Scoring failed: {}", episode_id, error);
                        LoopPhase::Terminated(Termination::Fatal(error))
                    }
                }
            }

            LoopPhase::Terminated(termination) => break termination,
        };
    };

    log::info!(
        "[{}] Episode finished: {} (turns={}, attempts={}, messages={}, tokens={})",
        episode_id,
        termination,
        turn,
        state.attempts,
        state.message_count(),
        state.budget.tokens_used()
    );

    let _ = event_tx
        .send(AgentEvent::Complete {
            termination: termination.to_string(),
            usage: state.budget.usage.clone(),
        })
        .await;

    state.outcome(termination)
}

/// Run an episode with default settings apart from the attempt count.
pub async fn run_agent_loop(
    state: &mut EpisodeState,
    event_tx: mpsc::Sender<AgentEvent>,
    llm: Arc<dyn LLMProvider>,
    tools: Arc<dyn ToolExecutor>,
    scorer: Arc<dyn Scorer>,
    cancel_token: CancellationToken,
    max_attempts: usize,
) -> EpisodeOutcome {
    run_agent_loop_with_config(
        state,
        event_tx,
        llm,
        tools,
        scorer,
        cancel_token,
        AgentLoopConfig {
            max_attempts,
            ..Default::default()
        },
    )
    .await
}

async fn apply_setup(state: &mut EpisodeState, config: &AgentLoopConfig) -> Result<(), AgentError> {
    for step in config.setup_steps() {
        step.apply(&mut state.conversation).await?;
    }
    Ok(())
}

struct DebugLogger {
    enabled: bool,
}

impl DebugLogger {
    fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    fn log_event(&self, episode_id: &str, event_type: &str, details: serde_json::Value) {
        if !self.enabled {
            return;
        }

        log::debug!("[{}] {}: {}", episode_id, event_type, details);
    }
}

struct Timer {
    name: String,
    start: std::time::Instant,
}

impl Timer {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: std::time::Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    fn debug(&self, episode_id: &str) {
        log::debug!(
            "[{}] {} completed in {}ms",
            episode_id,
            self.name,
            self.elapsed_ms()
        );
    }
}
