//! Repository listing error types.

use thiserror::Error;

/// Errors that can occur while listing candidate repositories.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// GitHub API error.
    #[error("GitHub API error on page {page}: {source}")]
    GitHubError {
        page: u32,
        #[source]
        source: octocrab::Error,
    },

    /// Rate limit lookup failed.
    #[error("Failed to check search rate limit: {0}")]
    RateLimit(#[from] octocrab::Error),
}
