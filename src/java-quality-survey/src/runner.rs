//! Orchestrates a metrics collection run.
//!
//! Listing, filtering, processing and persistence run strictly one
//! repository at a time.

mod config;
mod error;

pub use config::{resolve_token, RunnerConfig, TOKEN_ENV};
pub use error::RunnerError;

use crate::config::{FilterSettings, Settings};
use crate::discovery::{list_repositories, RepositoryDescriptor};
use crate::filter::{self, FilterDecision};
use crate::processor::{clear_stray_artifacts, reset_dir, RepositoryProcessor};
use crate::sink::ResultsSink;
use crate::summary::{ProcessingResult, RunSummary};
use chrono::Local;
use octocrab::Octocrab;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Orchestrates a full collection run.
pub struct Runner {
    config: RunnerConfig,
    octocrab: Octocrab,
    processor: RepositoryProcessor,
}

impl Runner {
    /// Builds a runner from the provided configuration.
    pub fn new(config: RunnerConfig) -> Result<Self, RunnerError> {
        let settings = config.settings();
        let octocrab = Octocrab::builder()
            .base_uri(settings.search.api_base_url.as_str())?
            .personal_token(config.token().to_string())
            .build()?;
        let processor = RepositoryProcessor::new(&settings.tools, &settings.paths);
        Ok(Self {
            config,
            octocrab,
            processor,
        })
    }

    /// Executes the full collection flow.
    ///
    /// `confirm` receives the number of repositories about to be processed
    /// and may cancel the run by returning `false`.
    pub async fn run<F>(&self, confirm: F) -> Result<RunSummary, RunnerError>
    where
        F: FnOnce(usize) -> bool,
    {
        let settings = self.config.settings();
        check_analyzer(settings)?;
        prepare_scratch(settings)?;

        let mut repositories = match list_repositories(&self.octocrab, &settings.search).await {
            Ok(repositories) => repositories,
            Err(e) => {
                error!(error = %e, "Failed to list repositories");
                Vec::new()
            }
        };

        if repositories.is_empty() {
            warn!("No repositories found, nothing to do");
            return Ok(RunSummary::new(0));
        }

        if let Some(max) = self.config.max_repositories() {
            repositories.truncate(max);
        }

        info!(count = repositories.len(), "Repositories to analyze");
        if !confirm(repositories.len()) {
            info!("Run cancelled by user");
            return Ok(RunSummary::new(repositories.len()));
        }

        let mut sink = ResultsSink::new(&settings.results, &settings.paths.results_dir);
        let mut summary = process_repositories(
            &self.processor,
            &settings.filter,
            &repositories,
            &mut sink,
            tokio::signal::ctrl_c(),
        )
        .await;

        match sink.finish() {
            Ok(path) => summary.results_path = path,
            Err(e) => error!(error = %e, "Failed to save results"),
        }

        Ok(summary)
    }
}

/// Verifies the analyzer entry point exists before anything is cloned.
///
/// # Errors
///
/// Returns [`RunnerError::AnalyzerMissing`] if the jar or program path is
/// absent.
pub fn check_analyzer(settings: &Settings) -> Result<(), RunnerError> {
    if let Some(path) = settings.tools.analyzer.entry_point() {
        if !path.exists() {
            return Err(RunnerError::AnalyzerMissing {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Wipes and recreates the clone and output roots, creates the results
/// directory and clears CK output left in the stray directory.
///
/// # Errors
///
/// Returns [`RunnerError::Scratch`] if either root cannot be reset, or
/// [`RunnerError::ResultsDir`] if the results directory cannot be created.
pub fn prepare_scratch(settings: &Settings) -> Result<(), RunnerError> {
    let paths = &settings.paths;
    for root in [&paths.clone_root, &paths.output_root] {
        reset_dir(root).map_err(|source| RunnerError::Scratch {
            path: root.clone(),
            source,
        })?;
    }
    std::fs::create_dir_all(&paths.results_dir).map_err(|source| RunnerError::ResultsDir {
        path: paths.results_dir.clone(),
        source,
    })?;
    clear_stray_artifacts(&paths.stray_artifact_dir);
    Ok(())
}

/// Filters and processes repositories in order, feeding successes to `sink`.
///
/// Stops early, without starting another repository, once `shutdown`
/// completes; the repository in flight is abandoned and its scratch
/// directories removed.
pub async fn process_repositories<S>(
    processor: &RepositoryProcessor,
    filter_settings: &FilterSettings,
    repositories: &[RepositoryDescriptor],
    sink: &mut ResultsSink,
    shutdown: S,
) -> RunSummary
where
    S: Future,
{
    let total = repositories.len();
    let mut summary = RunSummary::new(total);
    let started = Instant::now();
    tokio::pin!(shutdown);

    println!("\nProcessing {total} repositories...");
    println!("{}", "=".repeat(60));

    for (index, repository) in repositories.iter().enumerate() {
        let decision = filter::evaluate(repository, filter_settings);
        if let FilterDecision::Skip(reason) = decision {
            println!("\n--- Skipping {}/{}: {} ---", index + 1, total, repository.full_name);
            println!("⏭️  Reason: {reason}");
            summary.record_result(&ProcessingResult::Skipped {
                repository: repository.full_name.clone(),
                reason,
            });
            continue;
        }

        println!("\n--- Processing {}/{}: {} ---", index + 1, total, repository.full_name);
        match &decision {
            FilterDecision::Caution(reason) => println!("⚠️  Warning: {reason}"),
            _ => println!("✅ {}", decision.reason()),
        }
        print_progress(index, total, started.elapsed(), &summary);

        let outcome = tokio::select! {
            biased;
            _ = &mut shutdown => {
                warn!("Interrupted, no further repositories will be processed");
                summary.interrupted = true;
                break;
            }
            outcome = processor.process(repository) => outcome,
        };

        let repository_name = repository.full_name.clone();
        let result = match outcome {
            Ok(Some(record)) => {
                println!(
                    "✅ Metrics summarised: mean CBO={:.2}, mean LCOM={:.2}",
                    record.cbo_mean.unwrap_or(0.0),
                    record.lcom_mean.unwrap_or(0.0)
                );
                sink.record(record);
                ProcessingResult::Success {
                    repository: repository_name,
                }
            }
            Ok(None) => {
                println!("⚠️  No usable metrics");
                ProcessingResult::Empty {
                    repository: repository_name,
                    reason: "no usable CK output".to_string(),
                }
            }
            Err(e) => {
                error!(repo = %repository.full_name, error = %e, "Processing failed");
                println!("❌ ERROR: {e}");
                ProcessingResult::Failed {
                    repository: repository_name,
                    error: e.to_string(),
                }
            }
        };
        summary.record_result(&result);
    }

    summary.elapsed = started.elapsed();
    summary
}

/// Prints elapsed time, tallies and an estimated completion time.
fn print_progress(index: usize, total: usize, elapsed: Duration, summary: &RunSummary) {
    println!("⏱️  Elapsed: {}", format_duration(elapsed));
    println!(
        "📈 Succeeded: {} | ❌ Failed: {} | ⏭️  Skipped: {}",
        summary.succeeded, summary.failed, summary.skipped
    );

    if let Some(eta) = estimate_remaining(index, total, elapsed) {
        let completion = Local::now() + chrono::Duration::from_std(eta).unwrap_or_default();
        println!("🕐 Estimated completion: {}", completion.format("%H:%M:%S"));
    }
}

/// Remaining time extrapolated from the average time per started repository.
fn estimate_remaining(index: usize, total: usize, elapsed: Duration) -> Option<Duration> {
    if index == 0 {
        return None;
    }
    let average = elapsed / index as u32;
    Some(average * (total - index) as u32)
}

/// Formats a duration as `H:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_estimate_before_first_repository() {
        assert_eq!(estimate_remaining(0, 10, Duration::from_secs(5)), None);
    }

    #[test]
    fn extrapolates_average() {
        assert_eq!(
            estimate_remaining(2, 10, Duration::from_secs(20)),
            Some(Duration::from_secs(80))
        );
    }

    #[test]
    fn formats_duration() {
        assert_eq!(format_duration(Duration::from_secs(3_725)), "1:02:05");
    }
}
