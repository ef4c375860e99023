//! Wheel naming policy.
//!
//! A wheel for package `dbc`, version `0.1` and platform tag `win_amd64` is
//! called `dbc-0.1-py3-none-win_amd64.whl` and carries its metadata under
//! `dbc-0.1.dist-info/`. The launcher is plain Python with no ABI
//! dependency, hence the fixed `py3-none` prefix.

use crate::platform::PlatformTag;
use std::fmt;

/// Python and ABI tags shared by every wheel this crate produces.
const INTERPRETER_TAGS: &str = "py3-none";

/// The fixed file extension for wheels.
const WHEEL_EXTENSION: &str = ".whl";

/// The identity of one wheel: name, version, platform.
///
/// # Examples
///
/// ```
/// use dbc_wheels::platform::PlatformTag;
/// use dbc_wheels::wheel::WheelName;
///
/// let name = WheelName::new("dbc", "0.1", PlatformTag::new("win_amd64"));
/// assert_eq!(name.filename(), "dbc-0.1-py3-none-win_amd64.whl");
/// assert_eq!(name.dist_info(), "dbc-0.1.dist-info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelName {
    name: String,
    version: String,
    platform: PlatformTag,
}

impl WheelName {
    /// Create a wheel name from its components.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>, platform: PlatformTag) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform,
        }
    }

    /// Return the distribution name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the wheel version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Return the platform tag.
    #[must_use]
    pub fn platform(&self) -> &PlatformTag {
        &self.platform
    }

    /// Return the compressed tag triple, e.g. `py3-none-win_amd64`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{INTERPRETER_TAGS}-{}", self.platform)
    }

    /// Return one tag triple per platform in a compressed tag set.
    #[must_use]
    pub fn expanded_tags(&self) -> Vec<String> {
        self.platform
            .components()
            .map(|platform| format!("{INTERPRETER_TAGS}-{platform}"))
            .collect()
    }

    /// Return the `.dist-info` directory name.
    #[must_use]
    pub fn dist_info(&self) -> String {
        format!("{}-{}.dist-info", escape(&self.name), escape(&self.version))
    }

    /// Return the wheel file name.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WheelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}{WHEEL_EXTENSION}",
            escape(&self.name),
            escape(&self.version),
            self.tag()
        )
    }
}

/// Replace dashes, which delimit wheel file name components.
fn escape(component: &str) -> String {
    component.replace('-', "_")
}
