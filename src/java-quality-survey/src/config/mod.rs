//! Collector configuration.
//!
//! Settings are read from an optional TOML file; every key has a default so
//! a run without a settings file reproduces the original survey setup.

mod error;
mod settings;
mod tools;

pub use error::ConfigError;
pub use settings::{
    FilterSettings, PathSettings, ResultsSettings, SearchSettings, Settings, ToolSettings,
};
pub use tools::{AnalyzerCommand, CommandSpec};

use std::path::Path;
use tracing::{debug, info};
use url::Url;

/// Loads settings from `path`, or returns the defaults when `path` is `None`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, is not valid TOML, or
/// fails validation.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let Some(path) = path else {
        debug!("No settings file given, using defaults");
        return Ok(Settings::default());
    };

    info!(path = %path.display(), "Loading settings");

    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.display().to_string(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_settings(&content, &path.display().to_string())
}

/// Parses and validates settings from TOML text.
///
/// `origin` only labels errors.
pub fn parse_settings(content: &str, origin: &str) -> Result<Settings, ConfigError> {
    let mut settings: Settings = toml::from_str(content).map_err(|e| ConfigError::TomlError {
        path: origin.to_string(),
        source: e,
    })?;

    // Exclusions are matched case-insensitively.
    settings.filter.excluded = std::mem::take(&mut settings.filter.excluded)
        .into_iter()
        .map(|(name, reason)| (name.to_lowercase(), reason))
        .collect();

    validate_settings(&settings, origin)?;
    Ok(settings)
}

/// Validates settings.
fn validate_settings(settings: &Settings, origin: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        path: origin.to_string(),
        message,
    };

    let search = &settings.search;
    if Url::parse(&search.api_base_url).is_err() {
        return Err(invalid(format!(
            "search.api-base-url is not a valid URL: {}",
            search.api_base_url
        )));
    }

    if search.language.trim().is_empty() {
        return Err(invalid("search.language must not be empty".to_string()));
    }

    if search.per_page == 0 || search.per_page > 100 {
        return Err(invalid(format!(
            "search.per-page must be between 1 and 100, got {}",
            search.per_page
        )));
    }

    if search.max_pages == 0 {
        return Err(invalid("search.max-pages must be at least 1".to_string()));
    }

    let filter = &settings.filter;
    if filter.caution_mb < 0.0 || filter.hard_skip_mb < 0.0 {
        return Err(invalid("filter thresholds must not be negative".to_string()));
    }

    if filter.caution_mb > filter.hard_skip_mb {
        return Err(invalid(format!(
            "filter.caution-mb ({}) must not exceed filter.hard-skip-mb ({})",
            filter.caution_mb, filter.hard_skip_mb
        )));
    }

    if settings.results.checkpoint_every == 0 {
        return Err(invalid(
            "results.checkpoint-every must be at least 1".to_string(),
        ));
    }

    if settings.tools.git.program.trim().is_empty() {
        return Err(invalid("tools.git.program must not be empty".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_original_survey() {
        let settings = load_settings(None).unwrap();

        assert_eq!(settings.search.language, "java");
        assert_eq!(settings.search.per_page, 100);
        assert_eq!(settings.search.max_pages, 10);
        assert_eq!(settings.filter.hard_skip_mb, 500.0);
        assert_eq!(settings.filter.caution_mb, 200.0);
        assert_eq!(settings.filter.caution_size_kb, 50_000);
        assert_eq!(settings.filter.excluded.len(), 5);
        assert_eq!(settings.results.checkpoint_every, 50);
    }

    #[test]
    fn test_load_partial_settings_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        fs::write(
            &path,
            r#"
[search]
max-pages = 2

[filter.excluded]
"Acme/Monolith" = "Known broken build"

[tools.analyzer]
kind = "program"
program = "sh"
args = ["fake-ck.sh"]

[paths]
clone-root = "/tmp/clones"
"#,
        )
        .unwrap();

        let settings = load_settings(Some(&path)).unwrap();

        assert_eq!(settings.search.max_pages, 2);
        assert_eq!(settings.search.per_page, 100);
        assert_eq!(
            settings.filter.excluded.get("acme/monolith").map(String::as_str),
            Some("Known broken build")
        );
        assert_eq!(settings.filter.excluded.len(), 1);
        assert_eq!(settings.paths.clone_root, PathBuf::from("/tmp/clones"));
        assert_eq!(settings.paths.output_root, PathBuf::from("ck_metrics"));
        assert_eq!(
            settings.tools.analyzer.command_spec(),
            CommandSpec::new("sh").arg("fake-ck.sh")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = load_settings(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_validation_inverted_thresholds() {
        let result = parse_settings(
            r#"
[filter]
hard-skip-mb = 100.0
caution-mb = 200.0
"#,
            "inline",
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_validation_invalid_url() {
        let result = parse_settings(
            r#"
[search]
api-base-url = "not-a-url"
"#,
            "inline",
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_validation_page_size() {
        let result = parse_settings("[search]\nper-page = 0\n", "inline");
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_invalid_toml() {
        let result = parse_settings("[search\n", "inline");
        assert!(matches!(result, Err(ConfigError::TomlError { .. })));
    }
}
