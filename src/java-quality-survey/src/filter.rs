//! Pre-clone repository filter.
//!
//! Decides from listing metadata alone whether a repository is worth
//! cloning: known problematic repositories and oversized ones are skipped,
//! large ones are processed with a warning.

use crate::config::FilterSettings;
use crate::discovery::RepositoryDescriptor;

/// Outcome of filtering one repository.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDecision {
    /// Process normally.
    Proceed,

    /// Process, but the repository is large enough to warrant a warning.
    Caution(String),

    /// Do not clone or analyze.
    Skip(String),
}

impl FilterDecision {
    /// Returns true if the repository must not be processed.
    #[must_use]
    pub fn should_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    /// Human-readable reason for the decision.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::Proceed => "OK",
            Self::Caution(reason) | Self::Skip(reason) => reason,
        }
    }
}

/// Evaluates a repository against the exclusion list and size thresholds.
///
/// Pure and deterministic; exclusions win over every size rule.
pub fn evaluate(repository: &RepositoryDescriptor, settings: &FilterSettings) -> FilterDecision {
    let name = repository.full_name.to_lowercase();
    if let Some(reason) = settings.excluded.get(&name) {
        return FilterDecision::Skip(reason.clone());
    }

    let size_mb = repository.size_mb();
    if size_mb > settings.hard_skip_mb {
        return FilterDecision::Skip(format!("Repository too large ({size_mb:.1}MB)"));
    }

    if size_mb > settings.caution_mb {
        return FilterDecision::Caution(format!(
            "Large repository ({size_mb:.1}MB), processing with care"
        ));
    }

    if repository.size > settings.caution_size_kb {
        return FilterDecision::Caution(format!(
            "Many files ({} KB of content), processing with care",
            repository.size
        ));
    }

    FilterDecision::Proceed
}
