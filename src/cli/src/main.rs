//! CLI for the Java quality survey.
//!
//! `collect` lists the most-starred Java repositories, runs CK on each and
//! writes the results CSV; `analyze` correlates a results CSV with
//! popularity, maturity, size and activity.

use clap::{Parser, Subcommand};
use java_quality_survey::analysis::{
    AnalysisOutcome, AnalysisReport, Correlation, DatasetSource, ACTIVE_WINDOW_DAYS,
};
use java_quality_survey::runner::{format_duration, TOKEN_ENV};
use java_quality_survey::{
    load_settings, resolve_token, run_analysis, AnalysisConfig, RunSummary, Runner, RunnerConfig,
    RunnerError,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Java Quality Survey - CK metrics of popular Java repositories.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clone, analyze and summarise the top Java repositories.
    Collect {
        /// GitHub Personal Access Token.
        #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
        token: Option<String>,

        /// Start without asking for confirmation.
        #[arg(long, short = 'y')]
        yes: bool,

        /// Process at most this many of the listed repositories.
        #[arg(long)]
        max_repositories: Option<usize>,
    },

    /// Correlate collected metrics and write charts and a report.
    Analyze {
        /// Directory containing the results CSV (defaults to the configured
        /// results directory).
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Directory for charts and the report.
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Collect {
            token,
            yes,
            max_repositories,
        } => match collect(args.config, token, yes, max_repositories).await {
            Ok(summary) => {
                print_summary(&summary);

                if summary.has_failures() && summary.succeeded == 0 {
                    ExitCode::from(1)
                } else {
                    ExitCode::from(0)
                }
            }
            Err(e) => {
                error!(error = %e, "Critical failure");
                ExitCode::from(2)
            }
        },
        Command::Analyze {
            input_dir,
            output_dir,
        } => match analyze(args.config, input_dir, output_dir) {
            Ok(report) => {
                print_analysis(&report);
                ExitCode::from(0)
            }
            Err(e) => {
                error!(error = %e, "Analysis failed");
                ExitCode::from(2)
            }
        },
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

async fn collect(
    config_path: Option<PathBuf>,
    token: Option<String>,
    yes: bool,
    max_repositories: Option<usize>,
) -> Result<RunSummary, RunnerError> {
    let settings = load_settings(config_path.as_deref())?;
    let token = resolve_token(token)?;
    let config = RunnerConfig::new(settings, token).with_max_repositories(max_repositories);
    let runner = Runner::new(config)?;
    runner.run(|count| yes || confirm(count)).await
}

/// Asks on stdin whether to process `count` repositories.
fn confirm(count: usize) -> bool {
    print!("\nProcess {count} repositories? This may take hours. (y/N): ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn analyze(
    config_path: Option<PathBuf>,
    input_dir: Option<PathBuf>,
    output_dir: PathBuf,
) -> Result<AnalysisReport, Box<dyn std::error::Error>> {
    let settings = load_settings(config_path.as_deref())?;
    let input_dir = input_dir.unwrap_or_else(|| settings.paths.results_dir.clone());
    let config = AnalysisConfig::new(input_dir, output_dir, settings.results);
    Ok(run_analysis(&config)?)
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\n{}", "=".repeat(60));
    println!("Summary:");
    if summary.interrupted {
        println!("  Interrupted by user");
    }
    println!("  Repositories listed: {}", summary.repositories_listed);
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Failed: {}", summary.failed);
    println!("  Skipped: {}", summary.skipped);
    println!("  Without metrics: {}", summary.empty);
    println!("  Total time: {}", format_duration(summary.elapsed));

    if let Some(rate) = summary.success_rate() {
        println!("  Success rate: {rate:.1}%");
    }
    if let Some(average) = summary.average_time() {
        println!("  Average time per repository: {:.1}s", average.as_secs_f64());
    }
    match &summary.results_path {
        Some(path) => println!("  Results: {}", path.display()),
        None => println!("  Results: none written"),
    }
}

/// Prints correlations, skipped analyses and output locations.
fn print_analysis(report: &AnalysisReport) {
    let source = match report.source {
        DatasetSource::Complete => "complete",
        DatasetSource::Basic => "basic",
    };
    println!("\n{}", "=".repeat(60));
    println!("Loaded {} repositories ({source} results)", report.loaded);
    println!("After cleaning: {} with valid metrics", report.analysed);

    if let Some(overview) = &report.overview {
        println!("\nQuality metrics:");
        for s in &overview.summaries {
            println!(
                "  {}: mean {:.2}, median {:.2}, std {:.2}, min {:.2}, max {:.2}",
                s.column.to_uppercase(),
                s.mean,
                s.median,
                s.std,
                s.min,
                s.max
            );
        }
        println!("  Heatmap: {}", overview.heatmap.display());
    }

    let mut current = None;
    for outcome in &report.outcomes {
        let AnalysisOutcome::Completed(pair) = outcome else {
            continue;
        };
        if current != Some(pair.question) {
            println!("\n{}", pair.question.label().to_uppercase());
            current = Some(pair.question);
        }
        let describe = |c: Option<Correlation>| {
            c.map_or_else(
                || "n/a".to_string(),
                |c| format!("{:.3} (p={:.3})", c.coefficient, c.p_value),
            )
        };
        let marker = match pair.spearman {
            Some(c) if c.is_significant() => "✅",
            _ => "❌",
        };
        println!(
            "  {marker} {} vs {}: Spearman {} | Pearson {}",
            pair.dependent,
            pair.independent,
            describe(pair.spearman),
            describe(pair.pearson)
        );
    }

    for (analysis, reason) in report.skipped() {
        println!("\n⚠️  Skipped {analysis}: {reason}");
    }

    if let Some(percent) = report.activity.and_then(|a| a.percent()) {
        println!("\nUpdated in the last {ACTIVE_WINDOW_DAYS} days: {percent:.1}%");
    }
    println!("\nReport: {}", report.report_path.display());
}
