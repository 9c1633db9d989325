//! Single-repository processing: clone, analyze, aggregate, clean up.
//!
//! Every repository gets its own clone directory and analyzer output
//! directory. Both are removed when processing ends, whatever the outcome.

mod artifact;
mod command;
mod error;
mod scratch;

pub use artifact::{clear_stray_artifacts, collect_artifact, CLASS_ARTIFACT, SIDE_ARTIFACTS};
pub use error::ProcessError;

pub(crate) use scratch::reset_dir;

use crate::config::{CommandSpec, PathSettings, ToolSettings};
use crate::discovery::RepositoryDescriptor;
use crate::metrics::{aggregate, read_class_metrics};
use crate::record::RepositorySummary;
use chrono::{DateTime, Utc};
use command::run_command;
use scratch::ScratchGuard;
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn, Instrument};

/// Clones and analyzes one repository at a time.
#[derive(Debug, Clone)]
pub struct RepositoryProcessor {
    git: CommandSpec,
    analyzer: CommandSpec,
    clone_root: PathBuf,
    output_root: PathBuf,
    stray_dir: PathBuf,
    clock: fn() -> DateTime<Utc>,
}

impl RepositoryProcessor {
    /// Creates a processor from tool and path settings.
    pub fn new(tools: &ToolSettings, paths: &PathSettings) -> Self {
        Self {
            git: tools.git.clone(),
            analyzer: tools.analyzer.command_spec(),
            clone_root: paths.clone_root.clone(),
            output_root: paths.output_root.clone(),
            stray_dir: paths.stray_artifact_dir.clone(),
            clock: Utc::now,
        }
    }

    /// Replaces the wall clock used for repository age.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Clone and output directories used for `repository`.
    pub fn scratch_paths(&self, repository: &RepositoryDescriptor) -> (PathBuf, PathBuf) {
        let name = repository.scratch_name();
        (self.clone_root.join(&name), self.output_root.join(&name))
    }

    /// Clones, analyzes and summarises one repository.
    ///
    /// Returns `Ok(None)` when the analyzer produced no `class.csv` or the
    /// file held no valid metric values. Scratch directories are removed
    /// before this returns, including on error.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError`] if cloning, analysis or parsing fails.
    pub async fn process(
        &self,
        repository: &RepositoryDescriptor,
    ) -> Result<Option<RepositorySummary>, ProcessError> {
        let span = info_span!("process", repo = %repository.full_name);
        let (clone_dir, output_dir) = self.scratch_paths(repository);
        let _guard = ScratchGuard::new([clone_dir.clone(), output_dir.clone()]);

        async {
            for dir in [&self.clone_root, &output_dir] {
                std::fs::create_dir_all(dir).map_err(|source| ProcessError::Scratch {
                    path: dir.display().to_string(),
                    source,
                })?;
            }

            info!(url = %repository.clone_url, "Cloning");
            run_command(
                &self.git,
                [
                    OsStr::new("clone"),
                    OsStr::new("--depth"),
                    OsStr::new("1"),
                    OsStr::new(&repository.clone_url),
                    clone_dir.as_os_str(),
                ],
            )
            .await
            .map_err(|failure| ProcessError::CloneFailed {
                message: failure.describe(&self.git.program),
            })?;

            info!("Running CK analysis");
            clear_stray_artifacts(&self.stray_dir);
            if let Err(failure) =
                run_command(&self.analyzer, [clone_dir.as_os_str(), output_dir.as_os_str()]).await
            {
                clear_stray_artifacts(&self.stray_dir);
                return Err(ProcessError::AnalyzerFailed {
                    message: failure.describe(&self.analyzer.program),
                });
            }

            let Some(class_csv) = collect_artifact(&self.stray_dir, &output_dir)? else {
                warn!("No metrics generated (probably not a Java project)");
                return Ok(None);
            };

            let rows = read_class_metrics(&class_csv).map_err(|source| ProcessError::Parse {
                path: class_csv.display().to_string(),
                source,
            })?;
            debug!(rows = rows.len(), "Parsed class metrics");

            let metrics = aggregate(&rows);
            let summary = RepositorySummary::build(repository, &metrics, (self.clock)());
            if summary.is_none() {
                warn!("No valid metrics found in CK output");
            }
            Ok(summary)
        }
        .instrument(span)
        .await
    }
}
