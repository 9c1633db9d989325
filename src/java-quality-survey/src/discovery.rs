//! Repository listing using the GitHub repository search API.
//!
//! Fetches a fixed number of result pages for a single language, sorted by
//! stars, and concatenates the items in the order GitHub returns them.

mod error;
mod repository;

pub use error::DiscoveryError;
pub use repository::{RepositoryDescriptor, RepositoryLicense, RepositoryOwner, SearchPage};

use crate::config::SearchSettings;
use crate::rate_limit::ensure_search_rate_limit;
use octocrab::Octocrab;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

/// Query string parameters for `/search/repositories`.
#[derive(Debug, Serialize)]
struct SearchParams<'a> {
    q: String,
    sort: &'a str,
    order: &'a str,
    per_page: u8,
    page: u32,
}

/// Lists candidate repositories across `settings.max_pages` search pages.
///
/// Any failing page aborts the whole listing; there is no retry and no
/// partial result.
///
/// # Errors
///
/// Returns [`DiscoveryError`] if a page request or rate-limit check fails.
pub async fn list_repositories(
    octocrab: &Octocrab,
    settings: &SearchSettings,
) -> Result<Vec<RepositoryDescriptor>, DiscoveryError> {
    let span = info_span!(
        "list_repositories",
        language = %settings.language,
        sort = %settings.sort,
        max_pages = settings.max_pages
    );

    async {
        info!("Searching GitHub for repositories");
        let mut repositories = Vec::new();

        for page in 1..=settings.max_pages {
            ensure_search_rate_limit(octocrab).await?;

            let params = build_search_params(settings, page);
            debug!(query = %params.q, page, "Fetching search page");

            let response: SearchPage = octocrab
                .get("/search/repositories", Some(&params))
                .await
                .map_err(|source| DiscoveryError::GitHubError { page, source })?;

            if response.incomplete_results {
                warn!(page, "GitHub reported incomplete search results");
            }

            let available = response.total_count;
            repositories.extend(response.items);
            info!(
                page,
                max_pages = settings.max_pages,
                found = repositories.len(),
                available,
                "Fetched search page"
            );
        }

        Ok(repositories)
    }
    .instrument(span)
    .await
}

/// Builds the query parameters for one search page.
fn build_search_params(settings: &SearchSettings, page: u32) -> SearchParams<'_> {
    SearchParams {
        q: build_search_query(&settings.language),
        sort: &settings.sort,
        order: &settings.order,
        per_page: settings.per_page,
        page,
    }
}

/// Builds a GitHub repository search query.
///
/// Format: `language:{language}`
fn build_search_query(language: &str) -> String {
    format!("language:{}", language)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_search_query() {
        assert_eq!(build_search_query("java"), "language:java");
    }

    #[test]
    fn test_build_search_params() {
        let settings = SearchSettings::default();
        let params = build_search_params(&settings, 3);

        assert_eq!(params.q, "language:java");
        assert_eq!(params.sort, "stars");
        assert_eq!(params.order, "desc");
        assert_eq!(params.per_page, 100);
        assert_eq!(params.page, 3);
    }

    #[test]
    fn test_parse_search_page_fixture() {
        let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/search_page.json");
        let content = std::fs::read_to_string(path).unwrap();
        let page: SearchPage = serde_json::from_str(&content).unwrap();

        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].full_name, "Snailclimb/JavaGuide");
        assert_eq!(page.items[0].license_name(), "Apache License 2.0");
        assert_eq!(page.items[2].full_name, "spring-projects/spring-boot");
        assert!(page.items[1].topics.contains(&"algorithms".to_string()));
    }
}
