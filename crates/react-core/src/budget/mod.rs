//! Episode budget enforcement and context-overflow recovery.
//!
//! - [`tracker`]: message/token ceilings and the completion predicate
//! - [`overflow`]: oldest-first trimming when a generation is truncated

pub mod overflow;
pub mod tracker;

pub use overflow::{trim_oldest_non_system, TrimOutcome, MIN_TRIMMABLE_MESSAGES};
pub use tracker::{BudgetExceeded, BudgetTracker, DEFAULT_MESSAGE_LIMIT};
