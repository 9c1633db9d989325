//! Results accumulation and CSV persistence.
//!
//! Records accumulate in arrival order. Every `checkpoint_every` records the
//! whole set is written to the partial file, overwriting the previous
//! checkpoint; the complete file is written once at the end of a run.

use crate::config::ResultsSettings;
use crate::record::RepositorySummary;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors that can occur while persisting results.
#[derive(Debug, Error)]
pub enum SinkError {
    /// CSV encoding or I/O error.
    #[error("Failed to write results to '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Flushing the file failed.
    #[error("Failed to flush results to '{path}': {source}")]
    Flush {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading a results file failed.
    #[error("Failed to read results from '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
}

/// Accumulates summaries and writes checkpoint and final files.
#[derive(Debug)]
pub struct ResultsSink {
    records: Vec<RepositorySummary>,
    checkpoint_every: usize,
    partial_path: PathBuf,
    complete_path: PathBuf,
}

impl ResultsSink {
    /// Creates an empty sink writing into `results_dir`.
    pub fn new(settings: &ResultsSettings, results_dir: &Path) -> Self {
        Self {
            records: Vec::new(),
            checkpoint_every: settings.checkpoint_every.max(1),
            partial_path: results_dir.join(&settings.partial_file),
            complete_path: results_dir.join(&settings.complete_file),
        }
    }

    /// Appends a record, writing a checkpoint on every multiple of
    /// `checkpoint_every`.
    ///
    /// A failed checkpoint is logged; accumulation continues.
    pub fn record(&mut self, summary: RepositorySummary) {
        self.records.push(summary);

        if self.records.len() % self.checkpoint_every == 0 {
            info!(
                path = %self.partial_path.display(),
                count = self.records.len(),
                "Saving checkpoint"
            );
            if let Err(e) = write_dataset(&self.partial_path, &self.records) {
                error!(error = %e, "Failed to save checkpoint");
            }
        }
    }

    /// Records accumulated so far.
    pub fn records(&self) -> &[RepositorySummary] {
        &self.records
    }

    /// Number of records accumulated so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Path of the checkpoint file.
    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    /// Writes the complete file.
    ///
    /// Returns the written path, or `None` when there was nothing to write.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be written.
    pub fn finish(&self) -> Result<Option<PathBuf>, SinkError> {
        if self.records.is_empty() {
            warn!("No metrics were collected, no results file written");
            return Ok(None);
        }

        info!(
            path = %self.complete_path.display(),
            count = self.records.len(),
            "Saving results"
        );
        write_dataset(&self.complete_path, &self.records)?;
        Ok(Some(self.complete_path.clone()))
    }
}

/// Writes summaries as CSV with a header row, replacing any existing file.
///
/// The header is taken from the first record's field names. Nothing is
/// written for an empty slice.
///
/// # Errors
///
/// Returns [`SinkError`] if the file cannot be created or written.
pub fn write_dataset(path: &Path, records: &[RepositorySummary]) -> Result<(), SinkError> {
    if records.is_empty() {
        return Ok(());
    }

    let write_err = |source| SinkError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    for record in records {
        writer.serialize(record).map_err(write_err)?;
    }
    writer.flush().map_err(|source| SinkError::Flush {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

/// Reads summaries back from a file written by [`write_dataset`].
///
/// # Errors
///
/// Returns [`SinkError`] if the file is missing or a row does not match
/// the complete field set.
pub fn read_summaries(path: &Path) -> Result<Vec<RepositorySummary>, SinkError> {
    let read_err = |source| SinkError::Read {
        path: path.display().to_string(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::RepositoryDescriptor;
    use crate::metrics::{aggregate, ClassMetricRow};
    use chrono::Utc;
    use tempfile::TempDir;

    fn summary(index: usize) -> RepositorySummary {
        let descriptor: RepositoryDescriptor = serde_json::from_str(&format!(
            r#"{{
                "full_name": "acme/repo-{index}",
                "name": "repo-{index}",
                "clone_url": "https://github.com/acme/repo-{index}.git",
                "created_at": "2018-05-05T00:00:00Z",
                "stargazers_count": {index}
            }}"#
        ))
        .unwrap();
        let rows = vec![ClassMetricRow {
            cbo: index.to_string(),
            dit: "1".to_string(),
            lcom: "2".to_string(),
            ..Default::default()
        }];
        RepositorySummary::build(&descriptor, &aggregate(&rows), Utc::now()).unwrap()
    }

    #[test]
    fn empty_sink_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let sink = ResultsSink::new(&ResultsSettings::default(), temp.path());

        assert_eq!(sink.finish().unwrap(), None);
        assert!(!temp.path().join("results_complete.csv").exists());
    }

    #[test]
    fn checkpoints_on_multiples() {
        let temp = TempDir::new().unwrap();
        let settings = ResultsSettings {
            checkpoint_every: 2,
            ..Default::default()
        };
        let mut sink = ResultsSink::new(&settings, temp.path());

        sink.record(summary(1));
        assert!(!sink.partial_path().exists());

        sink.record(summary(2));
        assert_eq!(read_summaries(sink.partial_path()).unwrap().len(), 2);

        sink.record(summary(3));
        assert_eq!(read_summaries(sink.partial_path()).unwrap().len(), 2);

        sink.record(summary(4));
        assert_eq!(read_summaries(sink.partial_path()).unwrap().len(), 4);
    }

    #[test]
    fn round_trips_identity_and_means() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.csv");
        let records: Vec<_> = (1..=3).map(summary).collect();

        write_dataset(&path, &records).unwrap();
        let loaded = read_summaries(&path).unwrap();

        let pairs = |list: &[RepositorySummary]| {
            list.iter()
                .map(|r| (r.repository.clone(), r.cbo_mean))
                .collect::<Vec<_>>()
        };
        assert_eq!(pairs(&loaded), pairs(&records));
        assert_eq!(loaded[0].wmc_mean, None);
    }

    #[test]
    fn unwritable_checkpoint_does_not_stop_accumulation() {
        let temp = TempDir::new().unwrap();
        let settings = ResultsSettings {
            checkpoint_every: 1,
            ..Default::default()
        };
        let mut sink = ResultsSink::new(&settings, &temp.path().join("missing/dir"));

        sink.record(summary(1));
        sink.record(summary(2));

        assert_eq!(sink.len(), 2);
        assert!(sink.finish().is_err());
    }
}
