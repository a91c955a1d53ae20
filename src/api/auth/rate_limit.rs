//! Per-address throttling of login attempts.
//!
//! Counters live in process memory and reset when the window elapses; nothing
//! is persisted and no account is ever locked, only the address/window pair.

use std::{
    collections::HashMap,
    net::IpAddr,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

const MAX_ATTEMPTS: u32 = 5;
const WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_seconds: u64 },
}

#[derive(Debug)]
struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Default)]
pub struct LoginRateLimiter {
    attempts: Mutex<HashMap<IpAddr, Window>>,
}

impl LoginRateLimiter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a login attempt from `addr` and decide whether it may
    /// proceed. The 6th and later attempts inside a window are limited.
    pub async fn check(&self, addr: IpAddr) -> RateLimitDecision {
        self.check_at(addr, Instant::now()).await
    }

    pub(crate) async fn check_at(&self, addr: IpAddr, now: Instant) -> RateLimitDecision {
        let mut attempts = self.attempts.lock().await;

        // Drop windows that have elapsed so the map does not grow without
        // bound across many client addresses.
        attempts.retain(|_, window| now.saturating_duration_since(window.started_at) < WINDOW);

        let window = attempts.entry(addr).or_insert(Window {
            started_at: now,
            count: 0,
        });
        window.count += 1;

        if window.count > MAX_ATTEMPTS {
            let elapsed = now.saturating_duration_since(window.started_at);
            let retry_after = WINDOW.saturating_sub(elapsed);
            RateLimitDecision::Limited {
                retry_after_seconds: retry_after.as_secs().max(1),
            }
        } else {
            RateLimitDecision::Allowed
        }
    }
}
