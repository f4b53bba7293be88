//! Rate limiter for login attempts
//!
//! Failed attempts are counted per key (the client address). Entries whose
//! window and ban have both run out are dropped on every access, so the map
//! only holds keys that are still being throttled or watched.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::info;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of failed attempts allowed
    pub max_attempts: u32,
    /// Time window in seconds
    pub window_seconds: u64,
    /// Ban duration in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,        // 5 minutes
            ban_duration_seconds: 3600, // 1 hour
        }
    }
}

/// Rate limiter entry
#[derive(Debug)]
struct RateLimiterEntry {
    /// Number of failed attempts
    attempts: u32,
    /// Last failed attempt time
    last_attempt: Instant,
    /// Ban expiration time
    ban_expires: Option<Instant>,
}

impl RateLimiterEntry {
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        match self.ban_expires {
            Some(ban_expires) => now >= ban_expires,
            None => now.duration_since(self.last_attempt) >= window,
        }
    }
}

/// Rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    entries: Arc<Mutex<HashMap<String, RateLimiterEntry>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Whether `key` may attempt a login right now
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut entries = self.entries.lock().await;
        self.evict_stale(&mut entries, Instant::now());

        !entries
            .get(key)
            .is_some_and(|entry| entry.ban_expires.is_some())
    }

    /// Count a failed attempt for `key`, banning it once the limit is reached
    pub async fn record_failure(&self, key: &str) {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        self.evict_stale(&mut entries, now);

        let entry = entries.entry(key.to_string()).or_insert(RateLimiterEntry {
            attempts: 0,
            last_attempt: now,
            ban_expires: None,
        });

        if entry.ban_expires.is_some() {
            return;
        }

        entry.attempts += 1;
        entry.last_attempt = now;

        if entry.attempts >= self.config.max_attempts {
            entry.ban_expires = Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            info!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
        }
    }

    fn evict_stale(&self, entries: &mut HashMap<String, RateLimiterEntry>, now: Instant) {
        let window = Duration::from_secs(self.config.window_seconds);
        entries.retain(|_, entry| !entry.is_stale(now, window));
    }

    #[cfg(test)]
    async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_attempts: u32, window_seconds: u64, ban_duration_seconds: u64) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_attempts,
            window_seconds,
            ban_duration_seconds,
        })
    }

    #[tokio::test]
    async fn test_blocks_after_max_failures() {
        let limiter = limiter(3, 300, 3600);

        for _ in 0..3 {
            assert!(limiter.is_allowed("10.0.0.1").await);
            limiter.record_failure("10.0.0.1").await;
        }
        assert!(!limiter.is_allowed("10.0.0.1").await);
        limiter.record_failure("10.0.0.1").await;
        assert!(!limiter.is_allowed("10.0.0.1").await);

        assert!(limiter.is_allowed("10.0.0.2").await);
    }

    #[tokio::test]
    async fn test_checks_alone_do_not_count() {
        let limiter = limiter(2, 300, 3600);

        for _ in 0..10 {
            assert!(limiter.is_allowed("10.0.0.1").await);
        }
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn test_ban_expires() {
        let limiter = limiter(1, 300, 0);

        limiter.record_failure("10.0.0.1").await;
        assert!(limiter.is_allowed("10.0.0.1").await);
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn test_expired_entries_are_evicted() {
        let limiter = limiter(5, 0, 0);

        for i in 0..100 {
            limiter.record_failure(&format!("10.0.0.{}", i)).await;
        }

        // Each call drops the entries left behind by earlier calls.
        assert_eq!(limiter.tracked_keys().await, 1);
        assert!(limiter.is_allowed("10.0.0.250").await);
        assert_eq!(limiter.tracked_keys().await, 0);
    }

    #[tokio::test]
    async fn test_live_entries_are_kept() {
        let limiter = limiter(5, 300, 3600);

        limiter.record_failure("10.0.0.1").await;
        limiter.record_failure("10.0.0.2").await;

        assert_eq!(limiter.tracked_keys().await, 2);
    }
}
