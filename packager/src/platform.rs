//! Mapping from release platform keys to Python wheel platform tags.
//!
//! Release assets are named after Go's `GOOS`/`GOARCH` pair
//! (`linux-amd64`, `darwin-arm64`, ...). Wheels need the platform tag that
//! `pip` matches against the running interpreter. [`PlatformTable`] owns the
//! fixed mapping between the two; nothing outside this module reads the
//! [`PLATFORMS`] constant directly.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported `(os, arch)` pairs and their wheel platform tags, in the order
/// wheels are produced when every platform is selected.
pub const PLATFORMS: &[(&str, &str, &str)] = &[
    ("windows", "amd64", "win_amd64"),
    ("windows", "arm64", "win_arm64"),
    ("windows", "x86", "win32"),
    ("darwin", "amd64", "macosx_12_0_x86_64"),
    ("darwin", "arm64", "macosx_12_0_arm64"),
    (
        "linux",
        "amd64",
        "manylinux_2_17_x86_64.manylinux2014_x86_64",
    ),
    ("linux", "x86", "manylinux_2_12_i686.manylinux2010_i686"),
    (
        "linux",
        "arm64",
        "manylinux_2_17_aarch64.manylinux2014_aarch64",
    ),
    (
        "linux",
        "armv7a",
        "manylinux_2_17_armv7l.manylinux2014_armv7l",
    ),
    (
        "linux",
        "powerpc64le",
        "manylinux_2_17_ppc64le.manylinux2014_ppc64le",
    ),
    ("linux", "s390x", "manylinux_2_17_s390x.manylinux2014_s390x"),
    ("linux", "riscv64", "manylinux_2_31_riscv64"),
];

/// Errors arising from platform lookup and selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    /// The `(os, arch)` pair has no wheel platform tag.
    #[error("unsupported platform \"{key}\"; expected one of: {expected}")]
    Unsupported {
        /// The rejected platform key.
        key: String,
        /// Comma-separated list of supported keys.
        expected: String,
    },

    /// A platform key string is not of the form `<os>-<arch>`.
    #[error("invalid platform key \"{value}\"; expected <os>-<arch>")]
    InvalidKey {
        /// The rejected string.
        value: String,
    },

    /// A selector matched none of the supported platforms.
    #[error("no platforms selected by \"{selector}\"")]
    NothingSelected {
        /// The selector as given on the command line.
        selector: String,
    },
}

/// A canonical `(os, arch)` pair such as `linux-amd64`.
///
/// # Examples
///
/// ```
/// use dbc_wheels::platform::PlatformKey;
///
/// let key: PlatformKey = "linux-amd64".parse().expect("valid key");
/// assert_eq!(key.os(), "linux");
/// assert_eq!(key.arch(), "amd64");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformKey {
    os: String,
    arch: String,
}

impl PlatformKey {
    /// Create a key from its operating-system and architecture parts.
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Return the operating-system component.
    #[must_use]
    pub fn os(&self) -> &str {
        &self.os
    }

    /// Return the architecture component.
    #[must_use]
    pub fn arch(&self) -> &str {
        &self.arch
    }
}

impl FromStr for PlatformKey {
    type Err = PlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('-') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() && !arch.contains('-') => {
                Ok(Self::new(os, arch))
            }
            _ => Err(PlatformError::InvalidKey {
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// A wheel platform tag, possibly compressed (`a.b` means "a or b").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformTag(String);

impl PlatformTag {
    /// Wrap a raw tag string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Return the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a compressed tag set into its individual platform tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::platform::PlatformTag;
    ///
    /// let tag = PlatformTag::new("manylinux_2_17_aarch64.manylinux2014_aarch64");
    /// assert_eq!(
    ///     tag.components().collect::<Vec<_>>(),
    ///     ["manylinux_2_17_aarch64", "manylinux2014_aarch64"]
    /// );
    /// ```
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Whether the tag targets Windows, where the launcher cannot replace
    /// the interpreter process.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.0.starts_with("win")
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup table from [`PlatformKey`] to [`PlatformTag`].
#[derive(Debug, Clone, Copy)]
pub struct PlatformTable {
    entries: &'static [(&'static str, &'static str, &'static str)],
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::new(PLATFORMS)
    }
}

impl PlatformTable {
    /// Build a table over a static `(os, arch, tag)` list.
    #[must_use]
    pub const fn new(entries: &'static [(&'static str, &'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Map a platform key to its wheel tag.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] when the key is not present.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::platform::{PlatformKey, PlatformTable};
    ///
    /// let table = PlatformTable::default();
    /// let tag = table.map(&PlatformKey::new("darwin", "arm64")).expect("supported");
    /// assert_eq!(tag.as_str(), "macosx_12_0_arm64");
    /// ```
    pub fn map(&self, key: &PlatformKey) -> Result<PlatformTag, PlatformError> {
        self.entries
            .iter()
            .find(|(os, arch, _)| *os == key.os() && *arch == key.arch())
            .map(|(_, _, tag)| PlatformTag::new(*tag))
            .ok_or_else(|| PlatformError::Unsupported {
                key: key.to_string(),
                expected: self.keys().map(|k| k.to_string()).collect::<Vec<_>>().join(", "),
            })
    }

    /// Iterate over every supported key in table order.
    pub fn keys(&self) -> impl Iterator<Item = PlatformKey> + '_ {
        self.entries
            .iter()
            .map(|(os, arch, _)| PlatformKey::new(*os, *arch))
    }

    /// Resolve a selector into the list of matching keys, in table order
    /// and without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] if a pattern names a full
    /// key missing from the table, and [`PlatformError::NothingSelected`]
    /// if no key matches.
    pub fn select(&self, selector: &PlatformSelector) -> Result<Vec<PlatformKey>, PlatformError> {
        if let PlatformSelector::Patterns(patterns) = selector {
            for pattern in patterns.iter().filter(|p| p.contains('-')) {
                self.map(&pattern.parse()?)?;
            }
        }
        let selected: Vec<PlatformKey> = self.keys().filter(|key| selector.matches(key)).collect();
        if selected.is_empty() {
            return Err(PlatformError::NothingSelected {
                selector: selector.to_string(),
            });
        }
        Ok(selected)
    }
}

/// A set of platform patterns as accepted on the command line.
///
/// `all` selects every platform. Otherwise the value is a comma-separated
/// list where each pattern is an exact key (`linux-amd64`), an OS
/// (`linux`) or an architecture (`amd64`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformSelector {
    /// Every supported platform.
    All,
    /// Platforms matching any of the listed patterns.
    Patterns(Vec<String>),
}

impl PlatformSelector {
    /// Whether `key` is selected.
    #[must_use]
    pub fn matches(&self, key: &PlatformKey) -> bool {
        match self {
            Self::All => true,
            Self::Patterns(patterns) => patterns.iter().any(|pattern| {
                *pattern == key.to_string() || pattern == key.os() || pattern == key.arch()
            }),
        }
    }

    /// Return the single exact key this selector names, if it names one.
    #[must_use]
    pub fn exact_key(&self) -> Option<PlatformKey> {
        match self {
            Self::Patterns(patterns) if patterns.len() == 1 => {
                patterns.first().and_then(|p| p.parse().ok())
            }
            _ => None,
        }
    }
}

impl FromStr for PlatformSelector {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value == "all" {
            return Ok(Self::All);
        }
        Ok(Self::Patterns(
            value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

impl fmt::Display for PlatformSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Patterns(patterns) => f.write_str(&patterns.join(",")),
        }
    }
}
