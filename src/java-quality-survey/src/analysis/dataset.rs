//! Results dataset loading and cleaning.
//!
//! Columns are looked up by header name so that both the complete and the
//! basic results layouts load. Empty and non-numeric cells read as missing.

use super::error::AnalysisError;
use crate::config::ResultsSettings;
use csv::StringRecord;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which results file a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSource {
    Complete,
    Basic,
}

/// A results file held in memory.
#[derive(Debug, Clone)]
pub struct Dataset {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Dataset {
    /// Reads a results CSV.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Read`] if the file is missing or malformed.
    pub fn load(path: &Path) -> Result<Self, AnalysisError> {
        let read_error = |source| AnalysisError::Read {
            path: path.display().to_string(),
            source,
        };

        let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
        let headers = reader
            .headers()
            .map_err(read_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    /// Loads the complete results file from `dir`, falling back to the basic
    /// one.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoResults`] when neither file exists.
    pub fn load_preferred(
        dir: &Path,
        settings: &ResultsSettings,
    ) -> Result<(Self, DatasetSource), AnalysisError> {
        let complete = dir.join(&settings.complete_file);
        if complete.is_file() {
            info!(path = %complete.display(), "Loading complete results");
            return Ok((Self::load(&complete)?, DatasetSource::Complete));
        }

        let basic = dir.join(&settings.basic_file);
        if basic.is_file() {
            warn!(path = %basic.display(), "Complete results not found, loading basic results");
            return Ok((Self::load(&basic)?, DatasetSource::Basic));
        }

        Err(AnalysisError::NoResults {
            dir: dir.display().to_string(),
        })
    }

    /// File the dataset was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Numeric view of a column, `None` if the column does not exist.
    pub fn numeric(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(parse_cell))
                .collect(),
        )
    }

    /// Raw text of a column, `None` if the column does not exist.
    pub fn text(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).unwrap_or("").trim())
                .collect(),
        )
    }

    /// Removes rows where any `required` column is missing or non-numeric.
    ///
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::MissingColumn`] if a required column does
    /// not exist at all.
    pub fn drop_missing(&mut self, required: &[&str]) -> Result<usize, AnalysisError> {
        let indices = required
            .iter()
            .map(|&column| {
                self.column_index(column)
                    .ok_or_else(|| AnalysisError::MissingColumn {
                        column: column.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let before = self.rows.len();
        self.rows.retain(|row| {
            indices
                .iter()
                .all(|&i| row.get(i).and_then(parse_cell).is_some())
        });
        Ok(before - self.rows.len())
    }

    /// Rows where both columns hold numbers, as `(x, y)` pairs.
    pub fn pairs(&self, x: &str, y: &str) -> Option<Vec<(f64, f64)>> {
        let xs = self.numeric(x)?;
        let ys = self.numeric(y)?;
        Some(
            xs.into_iter()
                .zip(ys)
                .filter_map(|(x, y)| Some((x?, y?)))
                .collect(),
        )
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
