//! Collector settings parsed from a `settings.toml` file.
//!
//! Every key is optional; omitted keys fall back to the values the survey
//! was originally run with.

use super::tools::{AnalyzerCommand, CommandSpec};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// Repository search parameters.
    pub search: SearchSettings,

    /// Repository filter thresholds and exclusions.
    pub filter: FilterSettings,

    /// External commands.
    pub tools: ToolSettings,

    /// Scratch and output locations.
    pub paths: PathSettings,

    /// Interchange file names and checkpoint cadence.
    pub results: ResultsSettings,
}

/// Parameters for the repository search query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct SearchSettings {
    /// GitHub API root.
    pub api_base_url: String,

    /// Language qualifier used in the search query.
    pub language: String,

    /// Sort key.
    pub sort: String,

    /// Sort order.
    pub order: String,

    /// Results per page (GitHub caps this at 100).
    pub per_page: u8,

    /// Number of pages to fetch.
    pub max_pages: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            language: "java".to_string(),
            sort: "stars".to_string(),
            order: "desc".to_string(),
            per_page: 100,
            max_pages: 10,
        }
    }
}

/// Size thresholds and the static exclusion list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct FilterSettings {
    /// Repositories larger than this (MB) are skipped.
    pub hard_skip_mb: f64,

    /// Repositories larger than this (MB) are processed with a warning.
    pub caution_mb: f64,

    /// Raw size (KB) above which a repository is processed with a warning.
    pub caution_size_kb: u64,

    /// Lowercase `owner/name` to skip reason.
    pub excluded: BTreeMap<String, String>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            hard_skip_mb: 500.0,
            caution_mb: 200.0,
            caution_size_kb: 50_000,
            excluded: default_exclusions(),
        }
    }
}

fn default_exclusions() -> BTreeMap<String, String> {
    [
        (
            "spring-projects/spring-boot",
            "Filename too long (Windows limitation)",
        ),
        ("elastic/elasticsearch", "Too large, plus filename issues"),
        ("apache/hadoop", "Too large (>500MB)"),
        ("apache/kafka", "Too large (>200MB)"),
        ("apache/spark", "Too large (>300MB)"),
    ]
    .into_iter()
    .map(|(name, reason)| (name.to_string(), reason.to_string()))
    .collect()
}

/// External tools invoked per repository.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ToolSettings {
    /// Git executable used for shallow clones.
    pub git: CommandSpec,

    /// CK analyzer launcher.
    pub analyzer: AnalyzerCommand,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            git: CommandSpec::new("git"),
            analyzer: AnalyzerCommand::default(),
        }
    }
}

/// Filesystem locations used during a run.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PathSettings {
    /// Root for shallow clones. Wiped at run start.
    pub clone_root: PathBuf,

    /// Root for per-repository analyzer output. Wiped at run start.
    pub output_root: PathBuf,

    /// Directory where CK drops `class.csv` when it ignores the output path.
    pub stray_artifact_dir: PathBuf,

    /// Directory receiving the interchange CSV files.
    pub results_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            clone_root: PathBuf::from("temp_repos"),
            output_root: PathBuf::from("ck_metrics"),
            stray_artifact_dir: PathBuf::from("."),
            results_dir: PathBuf::from("."),
        }
    }
}

/// Interchange file names and checkpoint cadence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ResultsSettings {
    /// Write a partial checkpoint every time this many records accumulate.
    pub checkpoint_every: usize,

    /// Final dataset with the full field set.
    pub complete_file: String,

    /// Overwritten checkpoint.
    pub partial_file: String,

    /// Reduced dataset from the first collector revision.
    pub basic_file: String,
}

impl Default for ResultsSettings {
    fn default() -> Self {
        Self {
            checkpoint_every: 50,
            complete_file: "results_complete.csv".to_string(),
            partial_file: "results_partial.csv".to_string(),
            basic_file: "results_basic.csv".to_string(),
        }
    }
}
