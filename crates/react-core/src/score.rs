//! Scores produced by an external scorer and their numeric interpretation.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub const CORRECT: &str = "C";
pub const INCORRECT: &str = "I";
pub const PARTIAL: &str = "P";
pub const NOANSWER: &str = "N";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreValue::Bool(value) => write!(f, "{value}"),
            ScoreValue::Int(value) => write!(f, "{value}"),
            ScoreValue::Float(value) => write!(f, "{value}"),
            ScoreValue::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub value: ScoreValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Score {
    pub fn new(value: ScoreValue) -> Self {
        Self {
            value,
            answer: None,
            explanation: None,
        }
    }

    pub fn correct() -> Self {
        Self::new(ScoreValue::Text(CORRECT.to_string()))
    }

    pub fn incorrect() -> Self {
        Self::new(ScoreValue::Text(INCORRECT.to_string()))
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }
}

/// Conversion from a score value to a float on a 0..=1 scale.
pub type ValueToFloat = Arc<dyn Fn(&ScoreValue) -> f64 + Send + Sync>;

/// Standard mapping for categorical and numeric score values.
///
/// `C` is 1.0, `P` is 0.5, `I` and `N` are 0.0. `yes`/`true` and `no`/`false`
/// map to 1.0 and 0.0, numeric strings are parsed. Anything else is 0.0.
pub fn value_to_float() -> ValueToFloat {
    Arc::new(|value: &ScoreValue| match value {
        ScoreValue::Bool(flag) => f64::from(u8::from(*flag)),
        ScoreValue::Int(number) => *number as f64,
        ScoreValue::Float(number) => *number,
        ScoreValue::Text(text) => text_to_float(text),
    })
}

fn text_to_float(text: &str) -> f64 {
    let trimmed = text.trim();
    match trimmed {
        CORRECT => 1.0,
        PARTIAL => 0.5,
        INCORRECT | NOANSWER => 0.0,
        _ => match trimmed.to_ascii_lowercase().as_str() {
            "yes" | "true" => 1.0,
            "no" | "false" => 0.0,
            lowered => lowered.parse::<f64>().unwrap_or_else(|_| {
                log::warn!("Unable to convert score value '{}' to float", text);
                0.0
            }),
        },
    }
}
