use std::collections::BTreeMap;
use std::time::Duration;

use react_core::{Message, TokenUsage, ToolCall};
use serde::{Deserialize, Serialize};

/// Why the model stopped producing output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Stop,
    ToolCalls,
    /// Output was cut off because the conversation exceeded the context window
    ModelLength,
    Other(String),
}

impl StopReason {
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason {
            None | Some("stop") => StopReason::Stop,
            Some("tool_calls") | Some("function_call") => StopReason::ToolCalls,
            Some("length") | Some("model_length") => StopReason::ModelLength,
            Some(other) => StopReason::Other(other.to_string()),
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, StopReason::ModelLength)
    }
}

/// One model turn, immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub content: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    #[serde(default)]
    pub usage: TokenUsage,
}

impl GenerationResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            stop_reason: StopReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
            stop_reason: StopReason::ToolCalls,
            usage: TokenUsage::default(),
        }
    }

    pub fn truncated(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            stop_reason: StopReason::ModelLength,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// The assistant message to append to the conversation.
    pub fn to_message(&self) -> Message {
        Message::assistant(self.content.clone(), Some(self.tool_calls.clone()))
    }
}

const DEFAULT_CACHE_EXPIRY: &str = "1W";

/// Caching behaviour for generate calls: a plain switch or a full policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSetting {
    Enabled(bool),
    Policy(CachePolicy),
}

impl Default for CacheSetting {
    fn default() -> Self {
        CacheSetting::Enabled(false)
    }
}

impl CacheSetting {
    /// The effective policy, or `None` when caching is off.
    pub fn policy(&self) -> Option<CachePolicy> {
        match self {
            CacheSetting::Enabled(false) => None,
            CacheSetting::Enabled(true) => Some(CachePolicy::default()),
            CacheSetting::Policy(policy) => Some(policy.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Lifetime of a cached entry such as `30m`, `1D` or `1W`; `None` never expires
    #[serde(default = "default_expiry")]
    pub expiry: Option<String>,
    /// Extra key material separating otherwise identical requests
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
}

fn default_expiry() -> Option<String> {
    Some(DEFAULT_CACHE_EXPIRY.to_string())
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            expiry: default_expiry(),
            scopes: BTreeMap::new(),
        }
    }
}

impl CachePolicy {
    pub fn expiry_duration(&self) -> Option<Duration> {
        self.expiry.as_deref().and_then(parse_expiry)
    }
}

/// Parse `<n><unit>` where unit is one of `s m h D W M Y`.
pub fn parse_expiry(expiry: &str) -> Option<Duration> {
    let expiry = expiry.trim();
    let split = expiry.find(|c: char| !c.is_ascii_digit())?;
    let (amount, unit) = expiry.split_at(split);
    let amount: u64 = amount.parse().ok()?;

    let seconds_per_unit: u64 = match unit {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "D" => 24 * 60 * 60,
        "W" => 7 * 24 * 60 * 60,
        "M" => 30 * 24 * 60 * 60,
        "Y" => 365 * 24 * 60 * 60,
        _ => return None,
    };

    Some(Duration::from_secs(amount.saturating_mul(seconds_per_unit)))
}
