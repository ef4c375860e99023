//! HTTP retrieval of release metadata and asset bodies.
//!
//! Provides a trait-based abstraction for downloading asset archives so the
//! pipeline can be driven by stubs in tests, plus the shared `ureq` plumbing
//! the release resolver reuses. No request is retried and no internal
//! timeout is applied; a stalled read blocks until the caller's environment
//! intervenes.

use crate::release::Asset;
use crate::verification::{IntegrityError, verify_asset};
use log::debug;
use std::io::Read;
use std::sync::OnceLock;

/// Trait for downloading asset bodies.
///
/// # Examples
///
/// ```
/// use dbc_wheels::download::HttpFetcher;
///
/// let fetcher = HttpFetcher;
/// // Use fetcher.fetch("https://...") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait AssetFetcher {
    /// Download the body at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be read.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from HTTP downloads.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    HttpError {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The requested resource was not found (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error while reading the response body.
    #[error("I/O error reading download: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from [`fetch_and_verify`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The asset body could not be downloaded.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The downloaded bytes failed digest verification.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

/// HTTP-based fetcher using `ureq`.
pub struct HttpFetcher;

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = http_agent()
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body();
        let mut bytes = Vec::new();
        body.as_reader().read_to_end(&mut bytes)?;
        debug!("downloaded {} bytes from {url}", bytes.len());
        Ok(bytes)
    }
}

/// Download `asset` and accept its bytes only if they match its digest.
///
/// # Errors
///
/// Returns [`FetchError::Download`] if the body cannot be retrieved and
/// [`FetchError::Integrity`] if the digest is absent, unrecognised, or does
/// not match.
pub fn fetch_and_verify(fetcher: &dyn AssetFetcher, asset: &Asset) -> Result<Vec<u8>, FetchError> {
    let bytes = fetcher.fetch(&asset.download_url)?;
    verify_asset(asset, &bytes)?;
    Ok(bytes)
}

/// Perform a GET with the given extra headers and return the body as text.
pub(crate) fn get_text(url: &str, headers: &[(&str, String)]) -> Result<String, DownloadError> {
    let mut request = http_agent().get(url);
    for (name, value) in headers {
        request = request.header(*name, value.as_str());
    }
    let response = request.call().map_err(|e| map_ureq_error(url, &e))?;
    response
        .into_body()
        .read_to_string()
        .map_err(|e| DownloadError::HttpError {
            url: url.to_owned(),
            reason: e.to_string(),
        })
}

/// Shared `ureq` agent.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| ureq::Agent::new_with_config(ureq::Agent::config_builder().build()))
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::HttpError {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
