//! Packaging configuration.
//!
//! Every field has a default describing the dbc release, so a run without
//! `--config` packages dbc. A TOML file may override any subset of fields;
//! unknown keys are rejected so typos fail loudly.

use crate::wheel::metadata::Header;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

/// Errors arising while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration {path}: {source}")]
    Read {
        /// The file that was requested.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`PackageConfig`].
    #[error("invalid configuration {path}: {source}")]
    Parse {
        /// The file that failed to parse.
        path: Utf8PathBuf,
        /// The underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },
}

/// What to package and how to describe it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PackageConfig {
    /// Organisation owning the release repository.
    pub github_org: String,
    /// Release repository name.
    pub github_repo: String,
    /// Distribution name; the Python package directory is derived from it
    /// by [`PackageConfig::import_name`].
    pub package_name: String,
    /// Prefix identifying the binary among archive entries.
    pub binary_prefix: String,
    /// One-line summary for METADATA.
    pub summary: String,
    /// SPDX license expression.
    pub license_expression: String,
    /// License files that must be present in every archive.
    pub required_licenses: Vec<String>,
    /// Supported Python versions.
    pub requires_python: String,
    /// Long description embedded as the METADATA body.
    pub description_path: Utf8PathBuf,
    /// Content type of the long description.
    pub description_content_type: String,
    /// Directory receiving the wheels.
    pub out_dir: Utf8PathBuf,
    /// Base URL of the release API.
    pub api_base: String,
    /// Headers appended verbatim to METADATA.
    pub extra_metadata: Vec<Header>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            github_org: "columnar-tech".to_owned(),
            github_repo: "dbc".to_owned(),
            package_name: "dbc".to_owned(),
            binary_prefix: "dbc".to_owned(),
            summary: "dbc is a tool for installing ADBC drivers".to_owned(),
            license_expression: "Apache-2.0".to_owned(),
            required_licenses: vec!["LICENSE".to_owned()],
            requires_python: "~=3.5".to_owned(),
            description_path: Utf8PathBuf::from("README.pypi.md"),
            description_content_type: "text/markdown".to_owned(),
            out_dir: Utf8PathBuf::from("./dist"),
            api_base: "https://api.github.com".to_owned(),
            extra_metadata: Vec::new(),
        }
    }
}

impl PackageConfig {
    /// Load configuration from a TOML file, defaulting absent fields.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid configuration.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source: Box::new(source),
        })?;
        debug!("loaded configuration from {path}");
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::config::PackageConfig;
    ///
    /// let config = PackageConfig::from_toml("out_dir = \"wheels\"").expect("valid");
    /// assert_eq!(config.out_dir, "wheels");
    /// assert_eq!(config.package_name, "dbc");
    /// ```
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Name of the importable package directory, with `-` replaced by `_`
    /// the same way wheel file names escape it.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::config::PackageConfig;
    ///
    /// let config = PackageConfig::from_toml("package_name = \"my-tool\"").expect("valid");
    /// assert_eq!(config.import_name(), "my_tool");
    /// ```
    #[must_use]
    pub fn import_name(&self) -> String {
        self.package_name.replace('-', "_")
    }
}
