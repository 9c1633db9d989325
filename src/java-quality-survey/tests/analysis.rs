//! Correlation analysis over results files on disk.

use chrono::{TimeZone, Utc};
use java_quality_survey::analysis::{
    chart_file_name, AnalysisOutcome, DatasetSource, ResearchQuestion, HEATMAP_FILE, REPORT_FILE,
};
use java_quality_survey::config::ResultsSettings;
use java_quality_survey::{run_analysis, AnalysisConfig, AnalysisError};
use std::fs;
use tempfile::TempDir;

/// No `age_years` column, one row without a DIT mean.
const RESULTS_WITHOUT_AGE: &str = "\
repository,stars,forks,watchers,open_issues,size_kb,updated_at,cbo_mean,dit_mean,lcom_mean,wmc_mean,rfc_mean
a/one,150000,40000,150000,80,78000,2025-02-27T09:12:44Z,4.1,1.9,22.0,11.0,18.0
a/two,76000,13000,76000,18,1200000,2023-06-18T10:20:02Z,3.2,1.4,9.5,7.5,12.0
a/three,76100,40900,76100,500,118000,2025-02-27T10:03:55Z,5.6,2.4,40.1,14.2,25.3
a/four,52000,9000,52000,230,64000,2025-01-02T00:00:00Z,4.8,2.1,31.0,12.9,21.7
a/five,33000,7000,33000,40,21000,2024-11-15T00:00:00Z,2.9,1.3,7.2,6.1,10.4
a/six,21000,3000,21000,12,9000,2025-02-20T00:00:00Z,3.6,,12.0,8.8,14.1
";

fn config(temp: &TempDir) -> AnalysisConfig {
    AnalysisConfig::new(
        temp.path().to_path_buf(),
        temp.path().join("charts"),
        ResultsSettings::default(),
    )
    .with_now(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap())
}

#[test]
fn missing_age_skips_maturity_only() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("results_complete.csv"), RESULTS_WITHOUT_AGE).unwrap();

    let report = run_analysis(&config(&temp)).unwrap();

    assert_eq!(report.source, DatasetSource::Complete);
    assert_eq!(report.loaded, 6);
    assert_eq!(report.analysed, 5);

    let skipped: Vec<_> = report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].0, "RQ2 maturity");
    assert!(skipped[0].1.contains("age_years"));

    let questions: Vec<_> = report.completed().map(|p| p.question).collect();
    assert!(questions.contains(&ResearchQuestion::Popularity));
    assert!(questions.contains(&ResearchQuestion::Size));
    assert!(questions.contains(&ResearchQuestion::Activity));
    assert!(!questions.contains(&ResearchQuestion::Maturity));

    // 1 popularity + 1 size + 3 activity columns, against 5 quality means each.
    assert_eq!(report.completed().count(), 25);
    assert!(matches!(&report.outcomes[5], AnalysisOutcome::Skipped { .. }));
}

#[test]
fn writes_charts_heatmap_and_report() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("results_complete.csv"), RESULTS_WITHOUT_AGE).unwrap();

    let report = run_analysis(&config(&temp)).unwrap();
    let charts = temp.path().join("charts");

    assert!(charts.join(chart_file_name("cbo_mean", "stars")).is_file());
    assert!(charts.join(chart_file_name("rfc_mean", "open_issues")).is_file());
    assert!(charts.join(HEATMAP_FILE).is_file());
    assert_eq!(report.overview.as_ref().unwrap().columns.len(), 5);

    let text = fs::read_to_string(charts.join(REPORT_FILE)).unwrap();
    assert!(text.contains("Repositories analyzed: 5"));
    assert!(text.contains("Analysis date: 2025-03-01 00:00:00 UTC"));
    assert!(text.contains("stars: "));
    assert!(text.contains("cbo_mean: 4.12 ± "));
    assert!(!text.contains("age_years: "));

    // a/one and a/three updated within 30 days; a/six was dropped.
    let activity = report.activity.unwrap();
    assert_eq!(activity.dated, 5);
    assert_eq!(activity.active, 2);
}

#[test]
fn falls_back_to_basic_results() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("results_basic.csv"),
        "repository,stars,cbo_mean,dit_mean,lcom_mean\n\
         a/a,10,1.0,1.0,1.0\n\
         a/b,20,2.0,1.5,3.0\n\
         a/c,30,2.5,1.2,2.0\n",
    )
    .unwrap();

    let report = run_analysis(&config(&temp)).unwrap();

    assert_eq!(report.source, DatasetSource::Basic);
    assert_eq!(report.completed().count(), 3);
    assert_eq!(report.skipped().count(), 3);
    assert!(report.activity.is_none());
}

#[test]
fn no_results_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(matches!(
        run_analysis(&config(&temp)),
        Err(AnalysisError::NoResults { .. })
    ));
}

#[test]
fn all_rows_incomplete_is_an_error() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("results_complete.csv"),
        "repository,stars,cbo_mean,dit_mean,lcom_mean\na/a,10,,1.0,1.0\n",
    )
    .unwrap();

    assert!(matches!(
        run_analysis(&config(&temp)),
        Err(AnalysisError::EmptyDataset)
    ));
}
