//! Release lookup by tag.
//!
//! [`ReleaseResolver`] hides the release-hosting API behind a trait so that
//! the pipeline can be exercised with canned releases. [`GitHubResolver`]
//! performs a single GET against `/repos/{org}/{repo}/releases/tags/{tag}`.

use super::model::{Release, parse_release};
use crate::download::{DownloadError, get_text};
use log::{debug, error};

/// Errors arising from release resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// No release exists for the tag, or the repository is unknown.
    #[error("release {tag} not found at {url}")]
    NotFound {
        /// The tag that was requested.
        tag: String,
        /// The URL that returned 404.
        url: String,
    },

    /// The API could not be reached or answered with an error status.
    #[error("release lookup failed: {0}")]
    Network(DownloadError),

    /// The API answered with a body that is not a release.
    #[error("invalid release body from {url}: {source}")]
    Parse {
        /// The URL whose body failed to parse.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for looking up a release by tag.
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseResolver {
    /// Fetch the release tagged `tag` in `org/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the release does not exist, the API is
    /// unreachable, or the body cannot be parsed.
    fn resolve(&self, org: &str, repo: &str, tag: &str) -> Result<Release, ResolveError>;
}

/// Resolver backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubResolver {
    api_base: String,
    token: Option<String>,
}

impl GitHubResolver {
    /// Create a resolver against `api_base` (e.g. `https://api.github.com`),
    /// optionally authenticating with a bearer token.
    #[must_use]
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        Self {
            api_base: api_base.into(),
            token,
        }
    }

    /// Construct the releases-by-tag URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::release::GitHubResolver;
    ///
    /// let resolver = GitHubResolver::new("https://api.github.com/", None);
    /// assert_eq!(
    ///     resolver.release_url("columnar-tech", "dbc", "v0.1.0"),
    ///     "https://api.github.com/repos/columnar-tech/dbc/releases/tags/v0.1.0"
    /// );
    /// ```
    #[must_use]
    pub fn release_url(&self, org: &str, repo: &str, tag: &str) -> String {
        format!(
            "{}/repos/{org}/{repo}/releases/tags/{tag}",
            self.api_base.trim_end_matches('/')
        )
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept", "application/vnd.github+json".to_owned()),
            ("X-GitHub-Api-Version", "2022-11-28".to_owned()),
        ];
        if let Some(token) = &self.token {
            headers.push(("Authorization", format!("Bearer {token}")));
        }
        headers
    }
}

impl ReleaseResolver for GitHubResolver {
    fn resolve(&self, org: &str, repo: &str, tag: &str) -> Result<Release, ResolveError> {
        let url = self.release_url(org, repo, tag);
        debug!("resolving release {tag} from {url}");
        let outcome = get_text(&url, &self.headers())
            .map_err(|e| classify_download_error(tag, e))
            .and_then(|body| {
                parse_release(&body).map_err(|source| ResolveError::Parse {
                    url: url.clone(),
                    source,
                })
            });
        if let Err(e) = &outcome {
            error!("error fetching release data: {e}");
        }
        outcome
    }
}

fn classify_download_error(tag: &str, err: DownloadError) -> ResolveError {
    match err {
        DownloadError::NotFound { url } => ResolveError::NotFound {
            tag: tag.to_owned(),
            url,
        },
        other => ResolveError::Network(other),
    }
}
