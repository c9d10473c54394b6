//! Response cache for generate calls.
//!
//! A decorator around any [`LLMProvider`]: when the call's [`CacheSetting`]
//! enables caching, identical requests (same model, messages, tools and
//! policy scopes) are answered from memory until the policy expiry elapses.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use react_core::{tools::ToolSchema, Message};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::provider::{LLMProvider, Result};
use crate::providers::common::openai_compat::{
    messages_to_openai_compat_json, tools_to_openai_compat_json,
};
use crate::types::{CachePolicy, CacheSetting, GenerationResult};

struct CacheEntry {
    stored_at: Instant,
    expires_at: Option<Instant>,
    result: GenerationResult,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

pub struct CachingProvider {
    inner: Arc<dyn LLMProvider>,
    entries: DashMap<String, CacheEntry>,
}

impl CachingProvider {
    pub fn new(inner: Arc<dyn LLMProvider>) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cache_key(&self, messages: &[Message], tools: &[ToolSchema], policy: &CachePolicy) -> String {
        let material = json!({
            "model": self.inner.model_name(),
            "messages": messages_to_openai_compat_json(messages),
            "tools": tools_to_openai_compat_json(tools),
            "scopes": policy.scopes,
        });

        let mut hasher = Sha256::new();
        hasher.update(material.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn lookup(&self, key: &str, policy: &CachePolicy) -> Option<GenerationResult> {
        let entry = self.entries.get(key)?;
        // The caller's expiry applies as well as the one the entry was stored with.
        let expired = entry.is_expired(Instant::now())
            || policy
                .expiry_duration()
                .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl);

        if expired {
            drop(entry);
            self.entries.remove(key);
            return None;
        }

        Some(entry.result.clone())
    }

    fn store(&self, key: String, policy: &CachePolicy, result: GenerationResult) {
        let now = Instant::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: now,
                expires_at: policy.expiry_duration().and_then(|ttl| now.checked_add(ttl)),
                result,
            },
        );
    }
}

#[async_trait]
impl LLMProvider for CachingProvider {
    async fn generate(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        cache: &CacheSetting,
    ) -> Result<GenerationResult> {
        let Some(policy) = cache.policy() else {
            return self.inner.generate(messages, tools, cache).await;
        };

        let key = self.cache_key(messages, tools, &policy);
        if let Some(result) = self.lookup(&key, &policy) {
            log::debug!("Cache hit for generate request {}", &key[..12]);
            return Ok(result);
        }

        let result = self.inner.generate(messages, tools, cache).await?;
        // Truncated output depends on context pressure, not on the request alone.
        if !result.stop_reason.is_truncated() {
            self.store(key, &policy, result.clone());
        }

        Ok(result)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct CountingProvider {
        calls: AtomicUsize,
        truncate: bool,
    }

    #[async_trait]
    impl LLMProvider for CountingProvider {
        async fn generate(
            &self,
            _messages: &[Message],
            _tools: &[ToolSchema],
            _cache: &CacheSetting,
        ) -> Result<GenerationResult> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.truncate {
                Ok(GenerationResult::truncated(format!("partial {call}")))
            } else {
                Ok(GenerationResult::text(format!("answer {call}")))
            }
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    fn provider(truncate: bool) -> (Arc<CountingProvider>, CachingProvider) {
        let inner = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
            truncate,
        });
        let caching = CachingProvider::new(inner.clone());
        (inner, caching)
    }

    #[tokio::test]
    async fn disabled_cache_always_calls_inner() {
        let (inner, caching) = provider(false);
        let messages = vec![Message::user("hi")];

        caching.generate(&messages, &[], &CacheSetting::Enabled(false)).await.unwrap();
        caching.generate(&messages, &[], &CacheSetting::Enabled(false)).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(caching.is_empty());
    }

    #[tokio::test]
    async fn enabled_cache_reuses_identical_requests() {
        let (inner, caching) = provider(false);
        let messages = vec![Message::user("hi")];

        let first = caching.generate(&messages, &[], &CacheSetting::Enabled(true)).await.unwrap();
        // Fresh message ids and timestamps must not affect the key.
        let again = vec![Message::user("hi")];
        let second = caching.generate(&again, &[], &CacheSetting::Enabled(true)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);

        caching
            .generate(&[Message::user("other")], &[], &CacheSetting::Enabled(true))
            .await
            .unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn scopes_separate_entries_and_zero_expiry_refreshes() {
        let (inner, caching) = provider(false);
        let messages = vec![Message::user("hi")];

        let mut scoped = CachePolicy::default();
        scoped.scopes.insert("epoch".to_string(), "2".to_string());
        caching.generate(&messages, &[], &CacheSetting::Enabled(true)).await.unwrap();
        caching
            .generate(&messages, &[], &CacheSetting::Policy(scoped))
            .await
            .unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);

        let instant_expiry = CacheSetting::Policy(CachePolicy {
            expiry: Some("0s".to_string()),
            ..CachePolicy::default()
        });
        caching.generate(&messages, &[], &instant_expiry).await.unwrap();
        caching.generate(&messages, &[], &instant_expiry).await.unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn expired_entries_are_dropped_on_insert() {
        let (_inner, caching) = provider(false);
        let instant_expiry = CacheSetting::Policy(CachePolicy {
            expiry: Some("0s".to_string()),
            ..CachePolicy::default()
        });

        for prompt in ["one", "two", "three"] {
            caching
                .generate(&[Message::user(prompt)], &[], &instant_expiry)
                .await
                .unwrap();
        }
        assert_eq!(caching.len(), 1);

        caching
            .generate(&[Message::user("kept")], &[], &CacheSetting::Enabled(true))
            .await
            .unwrap();
        assert_eq!(caching.len(), 1);
    }

    #[tokio::test]
    async fn truncated_results_are_not_cached() {
        let (inner, caching) = provider(true);
        let messages = vec![Message::user("hi")];

        caching.generate(&messages, &[], &CacheSetting::Enabled(true)).await.unwrap();
        caching.generate(&messages, &[], &CacheSetting::Enabled(true)).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(caching.is_empty());
    }
}
