//! Per-repository processing error types.

use thiserror::Error;

/// Errors that end the processing of a single repository.
///
/// None of these abort a run; the repository is counted as failed.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Scratch directory could not be prepared.
    #[error("Failed to prepare '{path}': {source}")]
    Scratch {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Clone failed.
    #[error("Failed to clone repository: {message}")]
    CloneFailed { message: String },

    /// Analyzer could not be started or exited with a failure status.
    #[error("CK analysis failed: {message}")]
    AnalyzerFailed { message: String },

    /// Moving or removing analyzer output failed.
    #[error("Failed to collect analyzer output '{path}': {source}")]
    Artifact {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// `class.csv` could not be parsed.
    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: csv::Error,
    },
}
