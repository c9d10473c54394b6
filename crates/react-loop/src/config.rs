use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use react_core::{value_to_float, Score, ValueToFloat};
use react_llm::CacheSetting;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::setup::{SetupStep, SystemMessage};
use crate::state::EpisodeState;
use crate::submission::{SubmissionDetector, SubmitToolDetector};

pub const DEFAULT_SYSTEM_MESSAGE: &str = "
You are a helpful assistant attempting to submit the correct answer. You have
several functions available to help with finding the answer. Each message may
may perform one function call. You will see the result of the function right
after sending the message. If you need to perform multiple actions, you can
always send more messages with subsequent function calls. Do some reasoning
before your actions, describing what function calls you are going to use and
how they fit into your plan.

Use as much of the available time as possible to refine and optimize your submission: Your goal is to achieve the best possible score, not just to submit your first working solution. You may keep working until the time limit expires -- as long as your best submission is stored at the designated location at the end of your run, it will be picked up for grading.
";

pub const DEFAULT_INCORRECT_MESSAGE: &str = "
Your submission was incorrect. Please proceed and attempt to find the correct answer.
";

pub const DEFAULT_CONTINUE_MESSAGE: &str =
    "Please proceed to the next step using your best judgement.";

pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_CORRECT_THRESHOLD: f64 = 1.0;

pub type IncorrectMessageFn = Arc<dyn Fn(&EpisodeState, &[Score]) -> String + Send + Sync>;

/// Reply sent after an incorrect submission.
#[derive(Clone)]
pub enum MessageSource {
    Literal(String),
    /// Built from the episode and every score recorded so far
    Computed(IncorrectMessageFn),
}

impl MessageSource {
    pub fn computed<F>(build: F) -> Self
    where
        F: Fn(&EpisodeState, &[Score]) -> String + Send + Sync + 'static,
    {
        MessageSource::Computed(Arc::new(build))
    }

    pub fn resolve(&self, state: &EpisodeState, scores: &[Score]) -> String {
        match self {
            MessageSource::Literal(text) => text.clone(),
            MessageSource::Computed(build) => build(state, scores),
        }
    }
}

impl Default for MessageSource {
    fn default() -> Self {
        MessageSource::Literal(DEFAULT_INCORRECT_MESSAGE.to_string())
    }
}

impl From<&str> for MessageSource {
    fn from(text: &str) -> Self {
        MessageSource::Literal(text.to_string())
    }
}

impl From<String> for MessageSource {
    fn from(text: String) -> Self {
        MessageSource::Literal(text)
    }
}

impl fmt::Debug for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            MessageSource::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Configuration for the agent loop.
pub struct AgentLoopConfig {
    /// Falls back to the episode's own limit, then to 50
    pub message_limit: Option<usize>,
    /// Falls back to the episode's own limit, otherwise unlimited
    pub token_limit: Option<u64>,
    pub max_attempts: usize,
    pub cache: CacheSetting,
    pub incorrect_message: MessageSource,
    pub continue_message: String,
    pub score_value: ValueToFloat,
    pub correct_threshold: f64,
    /// Conversation setup; empty means the default system message
    pub init: Vec<Arc<dyn SetupStep>>,
    pub submission: Arc<dyn SubmissionDetector>,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            message_limit: None,
            token_limit: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            cache: CacheSetting::default(),
            incorrect_message: MessageSource::default(),
            continue_message: DEFAULT_CONTINUE_MESSAGE.to_string(),
            score_value: value_to_float(),
            correct_threshold: DEFAULT_CORRECT_THRESHOLD,
            init: Vec::new(),
            submission: Arc::new(SubmitToolDetector::default()),
        }
    }
}

impl AgentLoopConfig {
    /// Setup steps to run, substituting the default system message when none are configured.
    pub fn setup_steps(&self) -> Vec<Arc<dyn SetupStep>> {
        if self.init.is_empty() {
            vec![Arc::new(SystemMessage::new(DEFAULT_SYSTEM_MESSAGE))]
        } else {
            self.init.clone()
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Keyword arguments kept for older settings files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAgentArgs {
    /// Superseded by `message_limit`, but takes precedence when both are set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_messages: Option<usize>,
}

impl LegacyAgentArgs {
    fn resolve_message_limit(&self, message_limit: Option<usize>) -> Option<usize> {
        match (message_limit, self.max_messages) {
            (Some(limit), Some(legacy)) => {
                log::warn!(
                    "Deprecated max_messages={} overrides message_limit={}",
                    legacy,
                    limit
                );
                Some(legacy)
            }
            (None, Some(legacy)) => {
                log::debug!("Using deprecated max_messages={} as message_limit", legacy);
                Some(legacy)
            }
            (limit, None) => limit,
        }
    }
}

/// Serializable loop settings, typically read from a JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLoopSettings {
    pub message_limit: Option<usize>,
    pub token_limit: Option<u64>,
    pub max_attempts: Option<usize>,
    pub cache: CacheSetting,
    pub system_message: Option<String>,
    pub incorrect_message: Option<String>,
    pub continue_message: Option<String>,
    pub correct_threshold: Option<f64>,
    #[serde(flatten)]
    pub legacy: LegacyAgentArgs,
}

impl AgentLoopSettings {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Translate into the runtime configuration, folding legacy arguments in.
    pub fn into_config(self) -> Result<AgentLoopConfig, ConfigError> {
        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let correct_threshold = self.correct_threshold.unwrap_or(DEFAULT_CORRECT_THRESHOLD);
        if !correct_threshold.is_finite() {
            return Err(ConfigError::Invalid(
                "correct_threshold must be a finite number".to_string(),
            ));
        }

        let init: Vec<Arc<dyn SetupStep>> = match self.system_message {
            Some(system_message) => vec![Arc::new(SystemMessage::new(system_message))],
            None => Vec::new(),
        };

        Ok(AgentLoopConfig {
            message_limit: self.legacy.resolve_message_limit(self.message_limit),
            token_limit: self.token_limit,
            max_attempts,
            cache: self.cache,
            incorrect_message: self
                .incorrect_message
                .map(MessageSource::Literal)
                .unwrap_or_default(),
            continue_message: self
                .continue_message
                .unwrap_or_else(|| DEFAULT_CONTINUE_MESSAGE.to_string()),
            correct_threshold,
            init,
            ..AgentLoopConfig::default()
        })
    }
}
