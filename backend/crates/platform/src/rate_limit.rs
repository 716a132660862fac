//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by an arbitrary string (e.g. an email).
//! The embedded identity provider uses this to emulate the hosted
//! provider's "too many requests" response after repeated failed sign-ins.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Time until the current window resets
    pub reset_in: Duration,
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request and report whether it is within the limit
    async fn check_and_increment(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Report the current state without counting a request
    async fn peek(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Forget the counter for `key`
    async fn reset(&self, key: &str);
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Process-local rate limit store
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn evaluate(window: Option<&Window>, config: &RateLimitConfig, now: Instant) -> RateLimitResult {
        match window {
            Some(w) if now.duration_since(w.started) < config.window => RateLimitResult {
                allowed: w.count <= config.max_requests,
                remaining: config.max_requests.saturating_sub(w.count),
                reset_in: config.window - now.duration_since(w.started),
            },
            _ => RateLimitResult {
                allowed: true,
                remaining: config.max_requests,
                reset_in: Duration::ZERO,
            },
        }
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= config.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }
        window.count = window.count.saturating_add(1);

        Self::evaluate(Some(&*window), config, now)
    }

    async fn peek(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = Instant::now();
        let windows = self.windows.lock();
        let mut result = Self::evaluate(windows.get(key), config, now);
        // The next request would be the one counted.
        result.allowed = result.remaining > 0;
        result
    }

    async fn reset(&self, key: &str) {
        self.windows.lock().remove(key);
    }
}
