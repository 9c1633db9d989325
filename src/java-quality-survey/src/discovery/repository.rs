//! Repository descriptors as returned by the GitHub search API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One repository from a search result page. Never mutated after listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// Full repository name in "owner/name" format.
    pub full_name: String,

    /// Repository name.
    pub name: String,

    /// Owning user or organization.
    #[serde(default)]
    pub owner: Option<RepositoryOwner>,

    /// HTTPS clone URL.
    pub clone_url: String,

    #[serde(default)]
    pub stargazers_count: u64,

    #[serde(default)]
    pub forks_count: u64,

    #[serde(default)]
    pub watchers_count: u64,

    #[serde(default)]
    pub open_issues_count: u64,

    /// Repository size in KB.
    #[serde(default)]
    pub size: u64,

    /// Primary language as detected by GitHub.
    #[serde(default)]
    pub language: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub has_wiki: bool,

    #[serde(default)]
    pub has_pages: bool,

    #[serde(default)]
    pub has_downloads: bool,

    #[serde(default = "default_true")]
    pub has_issues: bool,

    #[serde(default)]
    pub has_projects: bool,

    #[serde(default)]
    pub archived: bool,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default)]
    pub fork: bool,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub license: Option<RepositoryLicense>,

    #[serde(default)]
    pub topics: Vec<String>,

    #[serde(default = "default_branch")]
    pub default_branch: String,
}

/// Owner of a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

/// License attached to a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryLicense {
    pub name: String,
}

fn default_true() -> bool {
    true
}

fn default_branch() -> String {
    "main".to_string()
}

impl RepositoryDescriptor {
    /// Repository owner login, falling back to the `full_name` prefix.
    pub fn owner_login(&self) -> &str {
        match &self.owner {
            Some(owner) => &owner.login,
            None => self
                .full_name
                .split_once('/')
                .map_or(self.full_name.as_str(), |(owner, _)| owner),
        }
    }

    /// Size in MB, derived from the KB figure GitHub reports.
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / 1024.0
    }

    /// Name usable as a single path component (`owner_name`).
    pub fn scratch_name(&self) -> String {
        format!("{}_{}", self.owner_login(), self.name).replace(['/', '\\'], "_")
    }

    /// License name, or an empty string when none is declared.
    pub fn license_name(&self) -> &str {
        self.license.as_ref().map_or("", |license| &license.name)
    }
}

/// One page of `/search/repositories`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,

    #[serde(default)]
    pub incomplete_results: bool,

    pub items: Vec<RepositoryDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "full_name": "acme/widgets",
        "name": "widgets",
        "clone_url": "https://github.com/acme/widgets.git",
        "created_at": "2015-03-01T12:00:00Z",
        "license": null,
        "language": null
    }"#;

    #[test]
    fn applies_github_defaults() {
        let repo: RepositoryDescriptor = serde_json::from_str(MINIMAL).unwrap();

        assert_eq!(repo.owner_login(), "acme");
        assert_eq!(repo.default_branch, "main");
        assert!(repo.has_issues);
        assert!(!repo.archived);
        assert_eq!(repo.license_name(), "");
        assert!(repo.topics.is_empty());
        assert_eq!(repo.scratch_name(), "acme_widgets");
    }

    #[test]
    fn scratch_name_prefers_owner_login() {
        let mut repo: RepositoryDescriptor = serde_json::from_str(MINIMAL).unwrap();
        repo.owner = Some(RepositoryOwner {
            login: "acme-corp".to_string(),
        });
        assert_eq!(repo.scratch_name(), "acme-corp_widgets");
    }

    #[test]
    fn converts_size_to_megabytes() {
        let mut repo: RepositoryDescriptor = serde_json::from_str(MINIMAL).unwrap();
        repo.size = 600 * 1024;
        assert_eq!(repo.size_mb(), 600.0);
    }
}
