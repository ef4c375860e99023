//! Release and asset records as served by the releases-by-tag endpoint.
//!
//! Only the fields the pipeline needs are modelled; everything else in the
//! API body is ignored during deserialisation.

use serde::Deserialize;

/// A published release and its downloadable assets.
///
/// # Examples
///
/// ```
/// use dbc_wheels::release::parse_release;
///
/// let json = concat!(
///     r#"{"tag_name":"v0.1","name":"dbc v0.1","published_at":"2025-07-01T12:00:00Z","#,
///     r#""assets":[{"name":"dbc-linux-amd64-0.1.tar.gz","#,
///     r#""browser_download_url":"https://example.test/dbc-linux-amd64-0.1.tar.gz","#,
///     r#""digest":"sha256:00"}]}"#,
/// );
/// let release = parse_release(json).expect("valid release");
/// assert_eq!(release.tag_name, "v0.1");
/// assert_eq!(release.assets.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    /// The git tag the release was cut from.
    pub tag_name: String,
    /// Human-readable release title.
    #[serde(default)]
    pub name: Option<String>,
    /// RFC 3339 publication timestamp.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Assets attached to the release, in API order.
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    /// The asset's file name.
    pub name: String,
    /// Direct download URL for the asset body.
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Digest in `<algorithm>:<hex>` form. Older releases may lack one.
    #[serde(default)]
    pub digest: Option<String>,
}

/// Parse a releases API body into a [`Release`].
///
/// # Errors
///
/// Returns the underlying [`serde_json::Error`] if the JSON is malformed or
/// a required field is missing.
pub fn parse_release(json: &str) -> Result<Release, serde_json::Error> {
    serde_json::from_str(json)
}
