//! ReAct episode driver: generate, act on tool calls, score submissions,
//! until a budget, the attempt limit or a fatal error ends the episode.

pub mod config;
pub mod runner;
pub mod scoring;
pub mod setup;
pub mod state;
pub mod submission;
pub mod turn;

pub use config::{AgentLoopConfig, AgentLoopSettings, ConfigError, LegacyAgentArgs, MessageSource};
pub use runner::{run_agent_loop, run_agent_loop_with_config};
pub use scoring::{ExactScorer, IncludesScorer, Scorer, ScorerError, Verdict};
pub use setup::{SetupStep, SystemMessage};
pub use state::{EpisodeOutcome, EpisodeState, Termination};
pub use submission::{NeverSubmit, SubmissionDetector, SubmitToolDetector};
pub use turn::{DispatchedCall, TurnOutcome};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
