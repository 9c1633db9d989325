//! Runner configuration.

use super::error::RunnerError;
use crate::config::Settings;

/// Environment variable holding the GitHub credential.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Placeholder some setups leave in `.env` files.
const TOKEN_PLACEHOLDER: &str = "YOUR_TOKEN_HERE";

/// Configuration for a collection run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Loaded settings.
    settings: Settings,
    /// GitHub token used for search API calls.
    token: String,
    /// Optional cap on the number of listed repositories to process.
    max_repositories: Option<usize>,
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    pub fn new(settings: Settings, token: String) -> Self {
        Self {
            settings,
            token,
            max_repositories: None,
        }
    }

    /// Limits processing to the first `max` listed repositories.
    #[must_use]
    pub fn with_max_repositories(mut self, max: Option<usize>) -> Self {
        self.max_repositories = max;
        self
    }

    /// Returns the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the configured GitHub token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the processing cap, if any.
    pub fn max_repositories(&self) -> Option<usize> {
        self.max_repositories
    }
}

/// Picks the explicit token or falls back to [`TOKEN_ENV`].
///
/// # Errors
///
/// Returns [`RunnerError::MissingToken`] when neither is set, or the value
/// is blank or the placeholder.
pub fn resolve_token(explicit: Option<String>) -> Result<String, RunnerError> {
    let token = explicit
        .or_else(|| std::env::var(TOKEN_ENV).ok())
        .map(|token| token.trim().to_string())
        .unwrap_or_default();

    if token.is_empty() || token == TOKEN_PLACEHOLDER {
        return Err(RunnerError::MissingToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_token_wins() {
        temp_env::with_var(TOKEN_ENV, Some("from-env"), || {
            assert_eq!(resolve_token(Some("explicit".into())).unwrap(), "explicit");
        });
    }

    #[test]
    fn falls_back_to_environment() {
        temp_env::with_var(TOKEN_ENV, Some(" from-env \n"), || {
            assert_eq!(resolve_token(None).unwrap(), "from-env");
        });
    }

    #[test]
    fn missing_token_is_fatal() {
        temp_env::with_var_unset(TOKEN_ENV, || {
            assert!(matches!(resolve_token(None), Err(RunnerError::MissingToken)));
        });
    }

    #[test]
    fn placeholder_is_rejected() {
        temp_env::with_var_unset(TOKEN_ENV, || {
            assert!(matches!(
                resolve_token(Some(TOKEN_PLACEHOLDER.into())),
                Err(RunnerError::MissingToken)
            ));
        });
    }
}
