//! Rate limiting for the GitHub search API.
//!
//! The search bucket is small (30 requests per minute for authenticated
//! users), so the lister checks it before every page.

mod info;

pub use info::RateLimitInfo;

use octocrab::Octocrab;
use tracing::{info, warn};

/// Checks the current rate limit status for the search API.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_search_rate_limit(
    octocrab: &Octocrab,
) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let search = &rate_limit.resources.search;

    Ok(RateLimitInfo {
        remaining: search.remaining as u32,
        reset: search.reset,
        limit: search.limit as u32,
    })
}

/// Sleeps until the search window resets if it is nearly exhausted.
///
/// Returns `true` if we waited.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(wait) = info.wait_duration(now) else {
        return false;
    };

    if info.reset.saturating_sub(now) > wait.as_secs() {
        warn!(
            reset = info.reset,
            wait_secs = wait.as_secs(),
            "Rate limit reset too far in future, capping wait time"
        );
    }

    info!(
        remaining = info.remaining,
        limit = info.limit,
        wait_secs = wait.as_secs(),
        "Search rate limit low, waiting for reset"
    );
    tokio::time::sleep(wait).await;
    true
}

/// Ensures sufficient rate limit before making a search API call.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_search_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_search_rate_limit(octocrab).await?;
    wait_if_needed(&info).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_wait_if_needed_no_wait() {
        let info = RateLimitInfo {
            remaining: 25,
            reset: 0,
            limit: 30,
        };

        assert!(!wait_if_needed(&info).await);
    }

    #[tokio::test]
    async fn test_wait_if_needed_reset_passed() {
        let info = RateLimitInfo {
            remaining: 0,
            reset: 0,
            limit: 30,
        };

        assert!(!wait_if_needed(&info).await);
    }
}
