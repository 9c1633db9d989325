//! Plain-text analysis report.

use super::error::AnalysisError;
use super::{AnalysisOutcome, PairAnalysis};
use chrono::{DateTime, Utc};
use handlebars::{no_escape, Handlebars};
use serde::Serialize;
use serde_json::json;
use statrs::statistics::Statistics;
use std::path::Path;

/// Columns summarised as `mean ± std` in the report.
pub const REPORT_COLUMNS: [&str; 5] = ["stars", "age_years", "cbo_mean", "dit_mean", "lcom_mean"];

const TEMPLATE: &str = "\
JAVA CODE QUALITY ANALYSIS REPORT
==================================================

Repositories analyzed: {{count}}
Analysis date: {{timestamp}}
Source: {{source}}

BASIC STATISTICS:
--------------------
{{#each statistics}}
{{column}}: {{mean}} ± {{std}}
{{/each}}
{{#if correlations}}

CORRELATIONS:
--------------------
{{#each correlations}}
{{dependent}} vs {{independent}} (n={{observations}}): Spearman {{spearman}}, Pearson {{pearson}}{{#if significant}} *{{/if}}
{{/each}}
{{/if}}
{{#if skipped}}

SKIPPED:
--------------------
{{#each skipped}}
{{analysis}}: {{reason}}
{{/each}}
{{/if}}
";

/// `mean ± std` line of one column, with the sample standard deviation.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnLine {
    pub column: String,
    pub mean: String,
    pub std: String,
}

impl ColumnLine {
    /// `None` when the column has no values.
    #[must_use]
    pub fn from_values(column: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            column: column.to_string(),
            mean: format!("{:.2}", values.iter().mean()),
            std: format!("{:.2}", values.iter().std_dev()),
        })
    }
}

#[derive(Serialize)]
struct CorrelationLine<'a> {
    dependent: &'a str,
    independent: &'a str,
    observations: usize,
    spearman: String,
    pearson: String,
    significant: bool,
}

impl<'a> CorrelationLine<'a> {
    fn new(pair: &'a PairAnalysis) -> Self {
        let describe = |c: Option<super::Correlation>| {
            c.map_or_else(
                || "n/a".to_string(),
                |c| format!("{:.3} (p={:.3})", c.coefficient, c.p_value),
            )
        };
        Self {
            dependent: &pair.dependent,
            independent: &pair.independent,
            observations: pair.observations,
            spearman: describe(pair.spearman),
            pearson: describe(pair.pearson),
            significant: pair.spearman.is_some_and(|c| c.is_significant()),
        }
    }
}

/// Renders the report text.
///
/// # Errors
///
/// Returns [`AnalysisError::Render`] if the template fails to render.
pub fn render_report(
    count: usize,
    source: &Path,
    now: DateTime<Utc>,
    statistics: &[ColumnLine],
    outcomes: &[AnalysisOutcome],
) -> Result<String, AnalysisError> {
    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(no_escape);
    hbs.set_strict_mode(true);

    let correlations: Vec<CorrelationLine> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            AnalysisOutcome::Completed(pair) => Some(CorrelationLine::new(pair)),
            AnalysisOutcome::Skipped { .. } => None,
        })
        .collect();
    let skipped: Vec<_> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            AnalysisOutcome::Skipped { analysis, reason } => {
                Some(json!({ "analysis": analysis, "reason": reason }))
            }
            AnalysisOutcome::Completed(_) => None,
        })
        .collect();

    let data = json!({
        "count": count,
        "timestamp": now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        "source": source.display().to_string(),
        "statistics": statistics,
        "correlations": correlations,
        "skipped": skipped,
    });

    Ok(hbs.render_template(TEMPLATE, &data)?)
}

/// Writes the rendered report to `path`.
///
/// # Errors
///
/// Returns [`AnalysisError::Io`] if the file cannot be written.
pub fn write_report(path: &Path, text: &str) -> Result<(), AnalysisError> {
    std::fs::write(path, text).map_err(|source| AnalysisError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Correlation, ResearchQuestion};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn uses_sample_standard_deviation() {
        let line = ColumnLine::from_values("stars", &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(line.mean, "2.50");
        assert_eq!(line.std, "1.29");
        assert!(ColumnLine::from_values("stars", &[]).is_none());
    }

    #[test]
    fn renders_sections() {
        let statistics = vec![ColumnLine::from_values("cbo_mean", &[2.0, 4.0]).unwrap()];
        let outcomes = vec![
            AnalysisOutcome::Completed(PairAnalysis {
                question: ResearchQuestion::Popularity,
                independent: "stars".to_string(),
                dependent: "cbo_mean".to_string(),
                observations: 10,
                log_scale: true,
                spearman: Some(Correlation {
                    coefficient: 0.5,
                    p_value: 0.01,
                }),
                pearson: None,
                chart: None,
            }),
            AnalysisOutcome::Skipped {
                analysis: "RQ2 maturity".to_string(),
                reason: "column 'age_years' not available".to_string(),
            },
        ];

        let text = render_report(10, Path::new("results.csv"), now(), &statistics, &outcomes).unwrap();

        assert!(text.contains("Repositories analyzed: 10"));
        assert!(text.contains("Analysis date: 2025-03-01 12:00:00 UTC"));
        assert!(text.contains("cbo_mean: 3.00 ± 1.41"));
        assert!(text.contains(
            "cbo_mean vs stars (n=10): Spearman 0.500 (p=0.010), Pearson n/a *"
        ));
        assert!(text.contains("RQ2 maturity: column 'age_years' not available"));
    }

    #[test]
    fn omits_empty_sections() {
        let text = render_report(0, Path::new("r.csv"), now(), &[], &[]).unwrap();
        assert!(!text.contains("CORRELATIONS"));
        assert!(!text.contains("SKIPPED"));
    }
}
