//! Login attempt limiting.
//!
//! Counters live behind [`RateLimitStore`] so the in-process map can be
//! replaced by a shared backend when running more than one instance.

use async_trait::async_trait;
use axum::http::HeaderMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::config::SecurityConfig;
use crate::security::sanitize_string;

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Counts one attempt for `key` and returns the total inside the current window.
    async fn increment(&self, key: &str, window: Duration) -> u32;

    /// Forgets every attempt recorded for `key`.
    async fn reset(&self, key: &str);
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window counters in process memory. Single-instance deployments only.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    entries: Mutex<HashMap<String, WindowEntry>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops windows that have already closed.
    pub async fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.lock().await.retain(|_, entry| entry.reset_at > now);
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn increment(&self, key: &str, window: Duration) -> u32 {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            reset_at: now + window,
        });

        if entry.reset_at <= now {
            entry.count = 0;
            entry.reset_at = now + window;
        }
        entry.count += 1;
        entry.count
    }

    async fn reset(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

/// Attempt cap was exceeded for the caller's fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimited {
    pub attempts: u32,
    pub retry_after: Duration,
}

#[derive(Clone)]
pub struct LoginRateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_attempts: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, max_attempts: u32, window: Duration) -> Self {
        Self {
            store,
            max_attempts,
            window,
        }
    }

    pub fn in_memory(security: &SecurityConfig) -> Self {
        Self::new(
            Arc::new(InMemoryRateLimitStore::new()),
            security.login_max_attempts,
            Duration::from_secs(security.login_window_secs),
        )
    }

    /// Records an attempt; `Err` once the count passes `max_attempts`.
    pub async fn check(&self, key: &str) -> Result<(), RateLimited> {
        let attempts = self.store.increment(key, self.window).await;
        if attempts > self.max_attempts {
            return Err(RateLimited {
                attempts,
                retry_after: self.window,
            });
        }
        Ok(())
    }

    pub async fn reset(&self, key: &str) {
        self.store.reset(key).await;
    }
}

impl std::fmt::Debug for LoginRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRateLimiter")
            .field("max_attempts", &self.max_attempts)
            .field("window", &self.window)
            .finish()
    }
}

/// Caller fingerprint: client address plus sanitized user agent.
pub fn client_fingerprint(headers: &HeaderMap) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let ip = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header("x-real-ip").map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or("unknown");
    let user_agent = header("user-agent").unwrap_or("unknown");

    format!("{}-{}", ip, sanitize_string(user_agent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter(max: u32, window: Duration) -> LoginRateLimiter {
        LoginRateLimiter::new(Arc::new(InMemoryRateLimitStore::new()), max, window)
    }

    #[tokio::test]
    async fn sixth_attempt_is_rejected() {
        let limiter = limiter(5, Duration::from_secs(900));
        for _ in 0..5 {
            assert!(limiter.check("1.2.3.4-curl").await.is_ok());
        }
        let err = limiter.check("1.2.3.4-curl").await.unwrap_err();
        assert_eq!(err.attempts, 6);

        assert!(limiter.check("5.6.7.8-curl").await.is_ok());
    }

    #[tokio::test]
    async fn reset_clears_the_counter() {
        let limiter = limiter(5, Duration::from_secs(900));
        for _ in 0..4 {
            limiter.check("k").await.unwrap();
        }
        limiter.reset("k").await;
        for _ in 0..5 {
            assert!(limiter.check("k").await.is_ok());
        }
    }

    #[tokio::test]
    async fn window_expiry_starts_a_new_count() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = LoginRateLimiter::new(store.clone(), 1, Duration::from_millis(50));
        limiter.check("k").await.unwrap();
        assert!(limiter.check("k").await.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check("k").await.is_ok());

        tokio::time::sleep(Duration::from_millis(80)).await;
        store.purge_expired().await;
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn fingerprint_prefers_forwarded_address() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        headers.insert("user-agent", HeaderValue::from_static("<Mozilla>"));
        assert_eq!(client_fingerprint(&headers), "203.0.113.7-Mozilla");

        headers.remove("x-forwarded-for");
        assert_eq!(client_fingerprint(&headers), "10.0.0.2-Mozilla");

        assert_eq!(client_fingerprint(&HeaderMap::new()), "unknown-unknown");
    }
}
