use react_core::tools::normalize_tool_name;
use react_tools::SUBMIT_TOOL_NAME;

use crate::turn::DispatchedCall;

/// Recognises a final answer among the calls made in one tool-dispatch turn.
pub trait SubmissionDetector: Send + Sync {
    fn detect(&self, dispatched: &[DispatchedCall]) -> Option<String>;
}

/// Treats the first successful call to the submit tool as the answer.
pub struct SubmitToolDetector {
    tool_name: String,
}

impl SubmitToolDetector {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
        }
    }
}

impl Default for SubmitToolDetector {
    fn default() -> Self {
        Self::new(SUBMIT_TOOL_NAME)
    }
}

impl SubmissionDetector for SubmitToolDetector {
    fn detect(&self, dispatched: &[DispatchedCall]) -> Option<String> {
        dispatched
            .iter()
            .find(|entry| {
                entry.result.success
                    && normalize_tool_name(&entry.call.function.name) == self.tool_name
            })
            .map(|entry| entry.result.result.clone())
    }
}

/// Never reports a submission, so only budgets end the episode.
pub struct NeverSubmit;

impl SubmissionDetector for NeverSubmit {
    fn detect(&self, _dispatched: &[DispatchedCall]) -> Option<String> {
        None
    }
}
