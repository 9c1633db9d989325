//! Run summary types.

use super::result::ProcessingResult;
use std::time::Duration;

/// Summary of a complete collection run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of repositories returned by the search.
    pub repositories_listed: usize,

    /// Repositories whose metrics were recorded.
    pub succeeded: usize,

    /// Repositories whose clone, analysis or parsing failed.
    pub failed: usize,

    /// Repositories rejected by the filter.
    pub skipped: usize,

    /// Repositories analyzed without usable metrics.
    pub empty: usize,

    /// Wall time of the processing loop.
    pub elapsed: Duration,

    /// Whether the run was stopped by an interrupt.
    pub interrupted: bool,

    /// Path of the complete results file, if one was written.
    pub results_path: Option<std::path::PathBuf>,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(repositories_listed: usize) -> Self {
        Self {
            repositories_listed,
            ..Default::default()
        }
    }

    /// Updates the summary with a processing result.
    pub fn record_result(&mut self, result: &ProcessingResult) {
        match result {
            ProcessingResult::Success { .. } => self.succeeded += 1,
            ProcessingResult::Empty { .. } => self.empty += 1,
            ProcessingResult::Skipped { .. } => self.skipped += 1,
            ProcessingResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Repositories that ended in success or failure.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Share of processed repositories that succeeded, in percent.
    #[must_use]
    pub fn success_rate(&self) -> Option<f64> {
        let processed = self.processed();
        (processed > 0).then(|| self.succeeded as f64 / processed as f64 * 100.0)
    }

    /// Mean wall time per processed repository.
    #[must_use]
    pub fn average_time(&self) -> Option<Duration> {
        let processed = self.processed();
        (processed > 0).then(|| self.elapsed / processed as u32)
    }

    /// Returns true if any repository failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
