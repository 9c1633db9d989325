//! Correlation analysis over a collected results dataset.
//!
//! Loads the complete (or basic) results file, drops rows without the core
//! quality means, then relates popularity, maturity, size and activity to
//! the quality means. Every analysed pair gets a scatter chart; a text
//! report summarises the run.

mod chart;
mod correlation;
mod dataset;
mod error;
mod report;

pub use chart::{chart_file_name, render_heatmap, render_scatter, ScatterLabels};
pub use correlation::{
    linear_fit, pearson, ranks, spearman, Correlation, MIN_PAIRS, SIGNIFICANCE_LEVEL,
};
pub use dataset::{Dataset, DatasetSource};
pub use error::AnalysisError;
pub use report::{render_report, write_report, ColumnLine, REPORT_COLUMNS};

use crate::config::ResultsSettings;
use chrono::{DateTime, Utc};
use statrs::statistics::{Data, Median, Statistics};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};

/// Rows missing any of these are dropped before analysis.
pub const REQUIRED_COLUMNS: [&str; 3] = ["cbo_mean", "dit_mean", "lcom_mean"];

/// Quality means each research question is related to.
pub const QUALITY_COLUMNS: [&str; 5] = ["cbo_mean", "dit_mean", "lcom_mean", "wmc_mean", "rfc_mean"];

/// Quality means covered by the overview and the correlation matrix.
pub const OVERVIEW_COLUMNS: [&str; 6] = [
    "cbo_mean", "dit_mean", "lcom_mean", "wmc_mean", "rfc_mean", "noc_mean",
];

/// Heatmap of correlations between quality means.
pub const HEATMAP_FILE: &str = "quality_metrics_correlation.png";

/// Text report.
pub const REPORT_FILE: &str = "analysis_report.txt";

/// A repository updated within this many days counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// The four research questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchQuestion {
    Popularity,
    Maturity,
    Size,
    Activity,
}

impl ResearchQuestion {
    pub const ALL: [Self; 4] = [Self::Popularity, Self::Maturity, Self::Size, Self::Activity];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Popularity => "RQ1 popularity",
            Self::Maturity => "RQ2 maturity",
            Self::Size => "RQ3 size",
            Self::Activity => "RQ4 activity",
        }
    }

    /// Independent columns and whether each is plotted as `log10(x + 1)`.
    pub fn independents(&self) -> &'static [(&'static str, bool)] {
        match self {
            Self::Popularity => &[("stars", true)],
            Self::Maturity => &[("age_years", false)],
            Self::Size => &[("size_kb", true)],
            Self::Activity => &[("forks", true), ("watchers", true), ("open_issues", true)],
        }
    }
}

/// Correlation of one independent column with one quality mean.
#[derive(Debug, Clone, PartialEq)]
pub struct PairAnalysis {
    pub question: ResearchQuestion,
    pub independent: String,
    pub dependent: String,
    /// Rows where both columns hold numbers.
    pub observations: usize,
    /// Whether the chart's horizontal axis is `log10(x + 1)`.
    pub log_scale: bool,
    pub spearman: Option<Correlation>,
    pub pearson: Option<Correlation>,
    pub chart: Option<PathBuf>,
}

/// What happened to one analysis step.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(PairAnalysis),
    Skipped { analysis: String, reason: String },
}

/// Descriptive statistics of one quality mean across repositories.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation.
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

/// Quality means overview and their correlation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityOverview {
    pub summaries: Vec<ColumnSummary>,
    pub columns: Vec<String>,
    /// Pearson coefficients; `None` where fewer than three paired rows
    /// exist or a column is constant.
    pub matrix: Vec<Vec<Option<f64>>>,
    pub heatmap: PathBuf,
}

/// Share of repositories updated within [`ACTIVE_WINDOW_DAYS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityShare {
    pub dated: usize,
    pub active: usize,
}

impl ActivityShare {
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        (self.dated > 0).then(|| self.active as f64 / self.dated as f64 * 100.0)
    }
}

/// Inputs of an analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub results: ResultsSettings,
    now: DateTime<Utc>,
}

impl AnalysisConfig {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, results: ResultsSettings) -> Self {
        Self {
            input_dir,
            output_dir,
            results,
            now: Utc::now(),
        }
    }

    /// Fixes the reference time used for activity and the report date.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

/// Everything an analysis run produced.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub source: DatasetSource,
    pub dataset_path: PathBuf,
    pub loaded: usize,
    /// Rows left after dropping incomplete ones.
    pub analysed: usize,
    pub overview: Option<QualityOverview>,
    pub outcomes: Vec<AnalysisOutcome>,
    pub activity: Option<ActivityShare>,
    pub report_path: PathBuf,
}

impl AnalysisReport {
    pub fn completed(&self) -> impl Iterator<Item = &PairAnalysis> {
        self.outcomes.iter().filter_map(|o| match o {
            AnalysisOutcome::Completed(pair) => Some(pair),
            AnalysisOutcome::Skipped { .. } => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            AnalysisOutcome::Skipped { analysis, reason } => Some((analysis.as_str(), reason.as_str())),
            AnalysisOutcome::Completed(_) => None,
        })
    }
}

/// Runs the full analysis and writes charts and the report into
/// `config.output_dir`.
///
/// # Errors
///
/// Fails when no results file exists, it cannot be read, it lacks the core
/// quality columns, no row survives cleaning, or an output cannot be
/// written. A research question whose independent column is missing is
/// skipped, not an error.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisReport, AnalysisError> {
    let _span = info_span!("analyze", input = %config.input_dir.display()).entered();

    let (mut dataset, source) = Dataset::load_preferred(&config.input_dir, &config.results)?;
    let loaded = dataset.len();
    info!(rows = loaded, path = %dataset.path().display(), "Loaded results");

    let removed = dataset.drop_missing(&REQUIRED_COLUMNS)?;
    info!(rows = dataset.len(), removed, "Dropped rows without core quality metrics");
    if dataset.is_empty() {
        return Err(AnalysisError::EmptyDataset);
    }

    std::fs::create_dir_all(&config.output_dir).map_err(|source| AnalysisError::Io {
        path: config.output_dir.display().to_string(),
        source,
    })?;

    let overview = quality_overview(&dataset, &config.output_dir)?;

    let mut outcomes = Vec::new();
    for question in ResearchQuestion::ALL {
        outcomes.extend(analyze_question(&dataset, question, &config.output_dir)?);
    }

    let activity = activity_share(&dataset, config.now);
    if let Some(percent) = activity.as_ref().and_then(ActivityShare::percent) {
        info!(
            percent = %format!("{percent:.1}"),
            "Repositories active in the last {ACTIVE_WINDOW_DAYS} days"
        );
    }

    let statistics: Vec<ColumnLine> = REPORT_COLUMNS
        .iter()
        .filter_map(|&column| {
            let values = present(dataset.numeric(column)?);
            ColumnLine::from_values(column, &values)
        })
        .collect();
    let text = render_report(dataset.len(), dataset.path(), config.now, &statistics, &outcomes)?;
    let report_path = config.output_dir.join(REPORT_FILE);
    write_report(&report_path, &text)?;
    info!(path = %report_path.display(), "Report saved");

    Ok(AnalysisReport {
        source,
        dataset_path: dataset.path().to_path_buf(),
        loaded,
        analysed: dataset.len(),
        overview,
        outcomes,
        activity,
        report_path,
    })
}

/// Correlates each independent column of `question` with every available
/// quality mean.
///
/// # Errors
///
/// Returns [`AnalysisError::Chart`] if a chart cannot be saved.
pub fn analyze_question(
    dataset: &Dataset,
    question: ResearchQuestion,
    output_dir: &Path,
) -> Result<Vec<AnalysisOutcome>, AnalysisError> {
    let available: Vec<_> = question
        .independents()
        .iter()
        .filter(|(column, _)| dataset.has_column(column))
        .collect();

    if available.is_empty() {
        let columns: Vec<_> = question.independents().iter().map(|(c, _)| *c).collect();
        let reason = format!("column '{}' not available", columns.join("', '"));
        warn!(analysis = question.label(), %reason, "Skipping analysis");
        return Ok(vec![AnalysisOutcome::Skipped {
            analysis: question.label().to_string(),
            reason,
        }]);
    }

    let mut outcomes = Vec::new();
    for &&(independent, log_scale) in &available {
        for dependent in QUALITY_COLUMNS.iter().filter(|c| dataset.has_column(c)) {
            let Some(pairs) = dataset.pairs(independent, dependent) else {
                continue;
            };
            outcomes.push(analyze_pair(
                question,
                independent,
                dependent,
                &pairs,
                log_scale,
                output_dir,
            )?);
        }
    }
    Ok(outcomes)
}

fn analyze_pair(
    question: ResearchQuestion,
    independent: &str,
    dependent: &str,
    pairs: &[(f64, f64)],
    log_scale: bool,
    output_dir: &Path,
) -> Result<AnalysisOutcome, AnalysisError> {
    if pairs.len() < MIN_PAIRS {
        let reason = format!("only {} paired observations", pairs.len());
        warn!(%independent, %dependent, %reason, "Not enough data to correlate");
        return Ok(AnalysisOutcome::Skipped {
            analysis: format!("{} {dependent} vs {independent}", question.label()),
            reason,
        });
    }

    let spearman = spearman(pairs);
    let pearson = pearson(pairs);
    info!(
        %independent,
        %dependent,
        n = pairs.len(),
        spearman = ?spearman.map(|c| c.coefficient),
        pearson = ?pearson.map(|c| c.coefficient),
        "Correlation computed"
    );

    let plotted: Vec<(f64, f64)> = if log_scale {
        pairs.iter().map(|&(x, y)| ((x + 1.0).log10(), y)).collect()
    } else {
        pairs.to_vec()
    };
    let coefficient = |c: Option<Correlation>| {
        c.map_or_else(|| "n/a".to_string(), |c| format!("{:.3}", c.coefficient))
    };
    let labels = ScatterLabels {
        title: format!("{} vs {}", dependent.to_uppercase(), independent.to_uppercase()),
        subtitle: format!(
            "Spearman: {} | Pearson: {}",
            coefficient(spearman),
            coefficient(pearson)
        ),
        x_axis: if log_scale {
            format!("{independent} (log10)")
        } else {
            independent.to_string()
        },
        y_axis: dependent.to_string(),
    };
    let chart = output_dir.join(chart_file_name(dependent, independent));
    render_scatter(&plotted, linear_fit(&plotted), &labels, &chart)?;

    Ok(AnalysisOutcome::Completed(PairAnalysis {
        question,
        independent: independent.to_string(),
        dependent: dependent.to_string(),
        observations: pairs.len(),
        log_scale,
        spearman,
        pearson,
        chart: Some(chart),
    }))
}

/// Describes the available quality means and renders their correlation
/// heatmap. `None` when none of [`OVERVIEW_COLUMNS`] exists.
///
/// # Errors
///
/// Returns [`AnalysisError::Chart`] if the heatmap cannot be saved.
pub fn quality_overview(
    dataset: &Dataset,
    output_dir: &Path,
) -> Result<Option<QualityOverview>, AnalysisError> {
    let columns: Vec<String> = OVERVIEW_COLUMNS
        .iter()
        .filter(|c| dataset.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if columns.is_empty() {
        warn!("No quality metric columns found");
        return Ok(None);
    }

    let summaries = columns
        .iter()
        .filter_map(|column| summarise_column(column, &present(dataset.numeric(column)?)))
        .collect();

    let matrix: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|a| {
            columns
                .iter()
                .map(|b| {
                    let pairs = dataset.pairs(a, b)?;
                    pearson(&pairs).map(|c| c.coefficient)
                })
                .collect()
        })
        .collect();

    let names: Vec<String> = columns
        .iter()
        .map(|c| c.trim_end_matches("_mean").to_uppercase())
        .collect();
    let heatmap = output_dir.join(HEATMAP_FILE);
    render_heatmap(&matrix, &names, "Quality metrics correlation (Pearson)", &heatmap)?;

    Ok(Some(QualityOverview {
        summaries,
        columns,
        matrix,
        heatmap,
    }))
}

fn summarise_column(column: &str, values: &[f64]) -> Option<ColumnSummary> {
    if values.is_empty() {
        return None;
    }
    Some(ColumnSummary {
        column: column.to_string(),
        mean: values.iter().mean(),
        median: Data::new(values.to_vec()).median(),
        std: values.iter().std_dev(),
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
    })
}

/// Counts repositories whose `updated_at` lies within
/// [`ACTIVE_WINDOW_DAYS`] of `now`. `None` without an `updated_at` column.
#[must_use]
pub fn activity_share(dataset: &Dataset, now: DateTime<Utc>) -> Option<ActivityShare> {
    let updated = dataset.text("updated_at")?;
    let days: Vec<i64> = updated
        .iter()
        .filter_map(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|updated| (now - updated.with_timezone(&Utc)).num_days())
        .collect();

    Some(ActivityShare {
        dated: days.len(),
        active: days.iter().filter(|&&d| d < ACTIVE_WINDOW_DAYS).count(),
    })
}

fn present(values: Vec<Option<f64>>) -> Vec<f64> {
    values.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "repository,stars,updated_at,cbo_mean,dit_mean,lcom_mean\n\
                       a/a,100,2025-02-25T00:00:00Z,1.0,1.0,2.0\n\
                       b/b,1000,2024-01-01T00:00:00Z,2.0,1.5,4.0\n\
                       c/c,10000,2025-02-28T00:00:00Z,3.0,2.0,3.0\n\
                       d/d,100000,,5.0,2.5,8.0\n";

    fn dataset(temp: &TempDir) -> Dataset {
        let path = temp.path().join("results.csv");
        fs::write(&path, CSV).unwrap();
        Dataset::load(&path).unwrap()
    }

    #[test]
    fn missing_independent_column_skips_question() {
        let temp = TempDir::new().unwrap();
        let outcomes =
            analyze_question(&dataset(&temp), ResearchQuestion::Maturity, temp.path()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            AnalysisOutcome::Skipped { analysis, reason }
                if analysis == "RQ2 maturity" && reason.contains("age_years")
        ));
    }

    #[test]
    fn popularity_correlates_available_quality_means() {
        let temp = TempDir::new().unwrap();
        let outcomes =
            analyze_question(&dataset(&temp), ResearchQuestion::Popularity, temp.path()).unwrap();

        let dependents: Vec<_> = outcomes
            .iter()
            .map(|o| match o {
                AnalysisOutcome::Completed(pair) => pair.dependent.as_str(),
                AnalysisOutcome::Skipped { .. } => "skipped",
            })
            .collect();
        assert_eq!(dependents, vec!["cbo_mean", "dit_mean", "lcom_mean"]);

        let AnalysisOutcome::Completed(cbo) = &outcomes[0] else {
            panic!("expected a completed analysis");
        };
        assert_eq!(cbo.observations, 4);
        assert!(cbo.log_scale);
        assert!((cbo.spearman.unwrap().coefficient - 1.0).abs() < 1e-9);
        assert!(temp.path().join("analise_cbo_mean_vs_stars.png").is_file());
    }

    #[test]
    fn counts_recently_updated_repositories() {
        let temp = TempDir::new().unwrap();
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();

        let share = activity_share(&dataset(&temp), now).unwrap();

        assert_eq!(share, ActivityShare { dated: 3, active: 2 });
        assert!((share.percent().unwrap() - 66.666).abs() < 0.01);
    }

    #[test]
    fn overview_covers_present_columns() {
        let temp = TempDir::new().unwrap();
        let overview = quality_overview(&dataset(&temp), temp.path()).unwrap().unwrap();

        assert_eq!(overview.columns, vec!["cbo_mean", "dit_mean", "lcom_mean"]);
        assert_eq!(overview.summaries[0].mean, 2.75);
        assert!((overview.matrix[0][0].unwrap() - 1.0).abs() < 1e-9);
        assert!(overview.heatmap.is_file());
    }
}
