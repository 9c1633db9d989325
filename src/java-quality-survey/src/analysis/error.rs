//! Analysis error types.

use thiserror::Error;

/// Errors that can occur while analyzing a results dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Neither the complete nor the basic results file exists.
    #[error("No results file found in '{dir}'; run `collect` first")]
    NoResults { dir: String },

    /// The results file could not be read.
    #[error("Failed to read results from '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A column required for cleaning is absent.
    #[error("Results file has no '{column}' column")]
    MissingColumn { column: String },

    /// No rows survived cleaning.
    #[error("No rows with valid metrics to analyze")]
    EmptyDataset,

    /// A chart could not be written.
    #[error("Failed to save chart '{path}': {source}")]
    Chart {
        path: String,
        #[source]
        source: image::ImageError,
    },

    /// Report template rendering error.
    #[error(transparent)]
    Render(#[from] handlebars::RenderError),

    /// Output directory or report I/O error.
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
