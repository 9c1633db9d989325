//! Runner error types.

use std::path::PathBuf;

/// Fatal errors that stop a run before or outside per-repository processing.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// GitHub API client initialization errors.
    #[error(transparent)]
    Octocrab(#[from] octocrab::Error),

    /// No GitHub credential was supplied.
    #[error("GitHub token not found; set GITHUB_TOKEN or pass --token")]
    MissingToken,

    /// The CK analyzer entry point does not exist.
    #[error("CK analyzer not found at '{}'", path.display())]
    AnalyzerMissing { path: PathBuf },

    /// Scratch roots could not be reset.
    #[error("Failed to prepare scratch directory '{}': {source}", path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The results directory could not be created.
    #[error("Failed to create results directory '{}': {source}", path.display())]
    ResultsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
