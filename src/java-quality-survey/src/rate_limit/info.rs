//! Search rate limit snapshot.

use std::time::Duration;

/// Maximum time to wait for a rate limit reset (1 hour).
pub(crate) const MAX_WAIT_SECS: u64 = 3600;

/// Minimum remaining requests before proactively waiting.
pub(crate) const MIN_REMAINING_THRESHOLD: u32 = 2;

/// Rate limit state of the search bucket.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,

    /// Unix timestamp when the rate limit resets.
    pub reset: u64,

    /// Total requests allowed per window.
    pub limit: u32,
}

impl RateLimitInfo {
    /// How long to sleep before the next request, given the current Unix time.
    ///
    /// `None` when enough requests remain or the window already reset.
    /// Waits are capped at [`MAX_WAIT_SECS`].
    pub fn wait_duration(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }

        Some(Duration::from_secs((self.reset - now).min(MAX_WAIT_SECS)))
    }
}
