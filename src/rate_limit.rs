// src/rate_limit.rs
use anyhow::Result;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::config_manager::RateLimitConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
}

/// Per-identity allow/deny quota check.
#[rocket::async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_limit(&self, identity: &str) -> Result<RateDecision>;
}

/// In-process sliding window: at most `max_requests` accepted per identity
/// in any `window`. Denied requests do not consume quota.
pub struct SlidingWindowLimiter {
    max_requests: u32,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_seconds))
    }

    fn check_at(&self, identity: &str, now: Instant) -> Result<RateDecision> {
        let mut hits = self
            .hits
            .lock()
            .map_err(|_| anyhow::anyhow!("Rate limiter state poisoned"))?;

        // Forget identities whose whole window has expired
        hits.retain(|_, stamps| {
            stamps
                .back()
                .is_some_and(|last| now.saturating_duration_since(*last) < self.window)
        });

        let stamps = hits.entry(identity.to_string()).or_default();
        while stamps
            .front()
            .is_some_and(|first| now.saturating_duration_since(*first) >= self.window)
        {
            stamps.pop_front();
        }

        let used = u32::try_from(stamps.len()).unwrap_or(u32::MAX);
        if used >= self.max_requests {
            warn!("Rate limit exceeded for {}", identity);
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
            });
        }

        stamps.push_back(now);
        let remaining = self.max_requests - used - 1;
        debug!("Rate limit check for {}: {} remaining", identity, remaining);

        Ok(RateDecision {
            allowed: true,
            remaining,
        })
    }
}

#[rocket::async_trait]
impl RateLimiter for SlidingWindowLimiter {
    async fn check_limit(&self, identity: &str) -> Result<RateDecision> {
        self.check_at(identity, Instant::now())
    }
}
