//! Token bucket rate limiter, keyed by principal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use planner_core::config::RateLimitConfig;

/// Buckets idle this long are dropped on the next sweep.
const IDLE_EVICTION: Duration = Duration::from_secs(300);

/// Simple in-memory token bucket rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Key → bucket state.
    buckets: Arc<Mutex<Buckets>>,
    /// Maximum tokens per bucket.
    max_tokens: f64,
    /// Token refill rate per second.
    refill_rate: f64,
    /// Disabled limiters admit everything.
    enabled: bool,
}

#[derive(Debug)]
struct Buckets {
    entries: HashMap<String, TokenBucket>,
    last_sweep: Instant,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Creates a limiter allowing bursts of `burst` and refilling at
    /// `requests_per_minute`.
    pub fn new(requests_per_minute: u32, burst: u32) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(Buckets {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            max_tokens: f64::from(burst.max(1)),
            refill_rate: f64::from(requests_per_minute) / 60.0,
            enabled: true,
        }
    }

    /// Creates a limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.requests_per_minute, config.burst)
        }
    }

    /// Attempts to consume a token for the given key.
    pub async fn check(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if now.duration_since(buckets.last_sweep) >= IDLE_EVICTION {
            buckets
                .entries
                .retain(|_, b| now.duration_since(b.last_refill) < IDLE_EVICTION);
            buckets.last_sweep = now;
        }

        let bucket = buckets
            .entries
            .entry(key.to_string())
            .or_insert(TokenBucket {
                tokens: self.max_tokens,
                last_refill: now,
            });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        bucket.last_refill = now;

        // Try to consume
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
