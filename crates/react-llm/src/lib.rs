pub mod cache;
pub mod provider;
pub mod providers;
pub mod types;

pub use cache::CachingProvider;
pub use provider::{LLMError, LLMProvider};
pub use providers::OpenAIProvider;
pub use types::{CachePolicy, CacheSetting, GenerationResult, StopReason};
