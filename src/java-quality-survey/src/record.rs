//! Interchange record written per successfully analyzed repository.

use crate::discovery::RepositoryDescriptor;
use crate::metrics::{FamilyStats, MetricFamily, MetricsSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Days per year used for `age_years`.
const DAYS_PER_YEAR: f64 = 365.25;

/// One row of the results dataset.
///
/// Field names are the interchange column names. Metric fields are `None`
/// when the family had no valid values and serialize as empty cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repository: String,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub size_kb: u64,
    pub language: String,
    pub created_at: String,
    pub updated_at: String,
    pub pushed_at: String,
    pub age_days: i64,
    pub age_years: f64,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_downloads: bool,
    pub has_issues: bool,
    pub has_projects: bool,
    pub archived: bool,
    pub disabled: bool,
    pub fork: bool,
    pub private: bool,
    pub license: String,
    pub topics: String,
    pub default_branch: String,

    pub wmc_mean: Option<f64>,
    pub wmc_median: Option<f64>,
    pub wmc_std: Option<f64>,
    pub wmc_max: Option<f64>,
    pub wmc_min: Option<f64>,

    pub rfc_mean: Option<f64>,
    pub rfc_median: Option<f64>,
    pub rfc_std: Option<f64>,
    pub rfc_max: Option<f64>,
    pub rfc_min: Option<f64>,

    pub cbo_mean: Option<f64>,
    pub cbo_median: Option<f64>,
    pub cbo_std: Option<f64>,
    pub cbo_max: Option<f64>,
    pub cbo_min: Option<f64>,

    pub dit_mean: Option<f64>,
    pub dit_median: Option<f64>,
    pub dit_std: Option<f64>,
    pub dit_max: Option<f64>,
    pub dit_min: Option<f64>,

    pub lcom_mean: Option<f64>,
    pub lcom_median: Option<f64>,
    pub lcom_std: Option<f64>,
    pub lcom_max: Option<f64>,
    pub lcom_min: Option<f64>,

    pub noc_mean: Option<f64>,
    pub noc_median: Option<f64>,
    pub noc_std: Option<f64>,
    pub noc_max: Option<f64>,
    pub noc_min: Option<f64>,

    pub complexity_mean: Option<f64>,
    pub complexity_std: Option<f64>,
    pub cohesion_mean: Option<f64>,
    pub cohesion_std: Option<f64>,

    pub total_classes: u64,
}

/// Repository age at `now`: whole days and fractional years.
#[must_use]
pub fn repository_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> (i64, f64) {
    let days = (now - created_at).num_days();
    (days, days as f64 / DAYS_PER_YEAR)
}

fn github_timestamp(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Splits optional family statistics into the five interchange columns.
fn columns(stats: Option<&FamilyStats>) -> [Option<f64>; 5] {
    match stats {
        Some(s) => [Some(s.mean), Some(s.median), Some(s.std), Some(s.max), Some(s.min)],
        None => [None; 5],
    }
}

impl RepositorySummary {
    /// Combines descriptor metadata, age at `now` and aggregated metrics.
    ///
    /// Returns `None` for an empty [`MetricsSummary`]; a summary is never
    /// built without at least one valid metric value.
    #[must_use]
    pub fn build(
        repository: &RepositoryDescriptor,
        metrics: &MetricsSummary,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        if metrics.is_empty() {
            return None;
        }

        let (age_days, age_years) = repository_age(repository.created_at, now);
        let [wmc_mean, wmc_median, wmc_std, wmc_max, wmc_min] =
            columns(metrics.family(MetricFamily::Wmc));
        let [rfc_mean, rfc_median, rfc_std, rfc_max, rfc_min] =
            columns(metrics.family(MetricFamily::Rfc));
        let [cbo_mean, cbo_median, cbo_std, cbo_max, cbo_min] =
            columns(metrics.family(MetricFamily::Cbo));
        let [dit_mean, dit_median, dit_std, dit_max, dit_min] =
            columns(metrics.family(MetricFamily::Dit));
        let [lcom_mean, lcom_median, lcom_std, lcom_max, lcom_min] =
            columns(metrics.family(MetricFamily::Lcom));
        let [noc_mean, noc_median, noc_std, noc_max, noc_min] =
            columns(metrics.family(MetricFamily::Noc));

        Some(Self {
            repository: repository.full_name.clone(),
            stars: repository.stargazers_count,
            forks: repository.forks_count,
            watchers: repository.watchers_count,
            open_issues: repository.open_issues_count,
            size_kb: repository.size,
            language: repository
                .language
                .clone()
                .unwrap_or_else(|| "Java".to_string()),
            created_at: github_timestamp(&repository.created_at),
            updated_at: repository
                .updated_at
                .as_ref()
                .map(github_timestamp)
                .unwrap_or_default(),
            pushed_at: repository
                .pushed_at
                .as_ref()
                .map(github_timestamp)
                .unwrap_or_default(),
            age_days,
            age_years,
            has_wiki: repository.has_wiki,
            has_pages: repository.has_pages,
            has_downloads: repository.has_downloads,
            has_issues: repository.has_issues,
            has_projects: repository.has_projects,
            archived: repository.archived,
            disabled: repository.disabled,
            fork: repository.fork,
            private: repository.private,
            license: repository.license_name().to_string(),
            topics: repository.topics.join(", "),
            default_branch: repository.default_branch.clone(),
            wmc_mean,
            wmc_median,
            wmc_std,
            wmc_max,
            wmc_min,
            rfc_mean,
            rfc_median,
            rfc_std,
            rfc_max,
            rfc_min,
            cbo_mean,
            cbo_median,
            cbo_std,
            cbo_max,
            cbo_min,
            dit_mean,
            dit_median,
            dit_std,
            dit_max,
            dit_min,
            lcom_mean,
            lcom_median,
            lcom_std,
            lcom_max,
            lcom_min,
            noc_mean,
            noc_median,
            noc_std,
            noc_max,
            noc_min,
            complexity_mean: metrics.complexity.map(|s| s.mean),
            complexity_std: metrics.complexity.map(|s| s.std),
            cohesion_mean: metrics.cohesion.map(|s| s.mean),
            cohesion_std: metrics.cohesion.map(|s| s.std),
            total_classes: metrics.total_classes as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{aggregate, ClassMetricRow};
    use chrono::TimeZone;

    fn descriptor() -> RepositoryDescriptor {
        serde_json::from_str(
            r#"{
                "full_name": "acme/widgets",
                "name": "widgets",
                "clone_url": "https://github.com/acme/widgets.git",
                "created_at": "2020-01-01T00:00:00Z",
                "updated_at": "2024-06-01T08:30:00Z",
                "stargazers_count": 1234,
                "topics": ["java", "orm"],
                "license": {"name": "MIT License"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn computes_age() {
        let created = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2021, 1, 1, 12, 0, 0).unwrap();

        let (days, years) = repository_age(created, now);

        assert_eq!(days, 366);
        assert!((years - 366.0 / 365.25).abs() < 1e-12);
    }

    #[test]
    fn builds_from_metrics() {
        let rows = vec![ClassMetricRow {
            cbo: "3".to_string(),
            ..Default::default()
        }];
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let summary = RepositorySummary::build(&descriptor(), &aggregate(&rows), now).unwrap();

        assert_eq!(summary.repository, "acme/widgets");
        assert_eq!(summary.stars, 1234);
        assert_eq!(summary.cbo_mean, Some(3.0));
        assert_eq!(summary.dit_mean, None);
        assert_eq!(summary.topics, "java, orm");
        assert_eq!(summary.license, "MIT License");
        assert_eq!(summary.updated_at, "2024-06-01T08:30:00Z");
        assert_eq!(summary.pushed_at, "");
        assert_eq!(summary.total_classes, 1);
    }

    #[test]
    fn refuses_empty_metrics() {
        let now = Utc::now();
        assert!(RepositorySummary::build(&descriptor(), &aggregate(&[]), now).is_none());
    }
}
