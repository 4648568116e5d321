use std::net::IpAddr;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::ApiError;

/// Fixed-window limiter keyed by client IP.
pub struct RateLimiter {
    /// Map from IP to (window start, requests seen in window)
    windows: DashMap<IpAddr, (Instant, u32)>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Count a request from `ip`.
    /// Returns Err(remaining wait) when the current window is exhausted.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        let now = Instant::now();

        let mut entry = self.windows.entry(ip).or_insert((now, 0));
        let (started, count) = entry.value_mut();

        if now.duration_since(*started) >= self.window {
            *started = now;
            *count = 1;
            return Ok(());
        }

        if *count >= self.max_requests {
            return Err(self.window - now.duration_since(*started));
        }

        *count += 1;
        Ok(())
    }

    /// Like [`check`](Self::check), as an [`ApiError`] for handlers.
    pub fn admit(&self, ip: IpAddr) -> Result<(), ApiError> {
        self.check(ip).map_err(|wait| {
            tracing::debug!("Rate limited {} for {:?}", ip, wait);
            ApiError::RateLimited(wait)
        })
    }

    /// Drop windows that ended long ago. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();
        self.windows
            .retain(|_, (started, _)| now.duration_since(*started) < self.window * 2);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Limiter for requests that reach the upstream search API (5 per second).
pub fn search_limiter() -> RateLimiter {
    RateLimiter::new(5, Duration::from_secs(1))
}

/// Limiter for favorites mutations (10 per second).
pub fn write_limiter() -> RateLimiter {
    RateLimiter::new(10, Duration::from_secs(1))
}
