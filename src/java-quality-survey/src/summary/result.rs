//! Processing result types.

/// Result of processing a single repository.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    /// Metrics were collected and recorded.
    Success {
        /// Repository full name.
        repository: String,
    },

    /// Analysis ran but yielded no usable metrics.
    Empty {
        /// Repository full name.
        repository: String,
        /// Why nothing was recorded.
        reason: String,
    },

    /// The filter rejected the repository before cloning.
    Skipped {
        /// Repository full name.
        repository: String,
        /// Reason for skipping.
        reason: String,
    },

    /// Cloning, analysis or parsing failed.
    Failed {
        /// Repository full name.
        repository: String,
        /// Error message.
        error: String,
    },
}
