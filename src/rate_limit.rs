//! Fixed-window request rate limiting.
//!
//! Each client key gets a counter that resets when its window rolls over.
//! The counter is process-local and shared by every route it guards.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in one window.
    pub max_requests: u32,
    /// Length of a window.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit configuration.
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self::with_window(max_requests, Duration::from_secs(window_secs))
    }

    /// Create a configuration with an arbitrary window length.
    pub fn with_window(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes.
    fn default() -> Self {
        Self::new(100, 15 * 60)
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Requests left in the current window.
        remaining: u32,
    },
    /// Request is denied until the window rolls over.
    Denied {
        /// Time until the window resets.
        retry_after: Duration,
    },
}

impl RateLimitResult {
    /// Check if the request is allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Counter for one client within the current window.
#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self {
            started: now,
            count: 0,
        }
    }

    fn expired(&self, now: Instant, length: Duration) -> bool {
        now.duration_since(self.started) >= length
    }

    fn resets_in(&self, now: Instant, length: Duration) -> Duration {
        length.saturating_sub(now.duration_since(self.started))
    }
}

/// Fixed-window rate limiter keyed by client.
///
/// # Example
///
/// ```
/// use vinnodrive::rate_limit::{RateLimitConfig, RequestRateLimiter};
///
/// let limiter = RequestRateLimiter::new(RateLimitConfig::new(2, 60));
///
/// assert!(limiter.check_and_record("10.0.0.1").is_allowed());
/// assert!(limiter.check_and_record("10.0.0.1").is_allowed());
/// assert!(!limiter.check_and_record("10.0.0.1").is_allowed());
/// assert!(limiter.check_and_record("10.0.0.2").is_allowed());
/// ```
#[derive(Debug)]
pub struct RequestRateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, Window>>,
}

impl RequestRateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Count a request for `key` and decide whether it may proceed.
    ///
    /// Denied requests are not counted.
    pub fn check_and_record(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        let window = clients
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now));

        if window.expired(now, self.config.window) {
            *window = Window::new(now);
        }

        if window.count >= self.config.max_requests {
            return RateLimitResult::Denied {
                retry_after: window.resets_in(now, self.config.window),
            };
        }

        window.count += 1;
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - window.count,
        }
    }

    /// Requests left for `key` in its current window.
    pub fn remaining(&self, key: &str) -> u32 {
        let now = Instant::now();
        let clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        match clients.get(key) {
            Some(window) if !window.expired(now, self.config.window) => {
                self.config.max_requests.saturating_sub(window.count)
            }
            _ => self.config.max_requests,
        }
    }

    /// Drop counters whose window has rolled over.
    ///
    /// Returns the number of counters removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        let before = clients.len();
        clients.retain(|_, window| !window.expired(now, self.config.window));
        before - clients.len()
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for RequestRateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_config() {
        let config = RateLimitConfig::new(5, 60);
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window, Duration::from_secs(60));

        let default = RateLimitConfig::default();
        assert_eq!(default.max_requests, 100);
        assert_eq!(default.window, Duration::from_secs(900));
    }

    #[test]
    fn test_allows_under_limit() {
        let limiter = RequestRateLimiter::new(RateLimitConfig::new(3, 60));

        assert_eq!(
            limiter.check_and_record("a"),
            RateLimitResult::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.check_and_record("a"),
            RateLimitResult::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check_and_record("a"),
            RateLimitResult::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_denies_over_limit() {
        let limiter = RequestRateLimiter::new(RateLimitConfig::new(2, 60));

        assert!(limiter.check_and_record("a").is_allowed());
        assert!(limiter.check_and_record("a").is_allowed());

        match limiter.check_and_record("a") {
            RateLimitResult::Denied { retry_after } => {
                assert!(retry_after <= Duration::from_secs(60));
                assert!(retry_after > Duration::from_secs(50));
            }
            other => panic!("Expected Denied, got {:?}", other),
        }
    }

    #[test]
    fn test_separate_clients() {
        let limiter = RequestRateLimiter::new(RateLimitConfig::new(1, 60));

        assert!(limiter.check_and_record("a").is_allowed());
        assert!(!limiter.check_and_record("a").is_allowed());
        assert!(limiter.check_and_record("b").is_allowed());
    }

    #[test]
    fn test_window_rolls_over() {
        let limiter =
            RequestRateLimiter::new(RateLimitConfig::with_window(1, Duration::from_millis(50)));

        assert!(limiter.check_and_record("a").is_allowed());
        assert!(!limiter.check_and_record("a").is_allowed());

        std::thread::sleep(Duration::from_millis(80));

        assert!(limiter.check_and_record("a").is_allowed());
    }

    #[test]
    fn test_remaining() {
        let limiter = RequestRateLimiter::new(RateLimitConfig::new(5, 60));

        assert_eq!(limiter.remaining("a"), 5);
        limiter.check_and_record("a");
        limiter.check_and_record("a");
        assert_eq!(limiter.remaining("a"), 3);
    }

    #[test]
    fn test_denied_requests_are_not_counted() {
        let limiter = RequestRateLimiter::new(RateLimitConfig::new(1, 60));

        limiter.check_and_record("a");
        limiter.check_and_record("a");
        limiter.check_and_record("a");

        assert_eq!(limiter.remaining("a"), 0);
    }

    #[test]
    fn test_cleanup_drops_expired_windows() {
        let limiter =
            RequestRateLimiter::new(RateLimitConfig::with_window(10, Duration::from_millis(30)));

        limiter.check_and_record("a");
        limiter.check_and_record("b");
        assert_eq!(limiter.tracked_clients(), 2);
        assert_eq!(limiter.cleanup(), 0);

        std::thread::sleep(Duration::from_millis(50));

        assert_eq!(limiter.cleanup(), 2);
        assert_eq!(limiter.tracked_clients(), 0);
    }
}
