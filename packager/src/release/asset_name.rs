//! Asset naming convention for platform release archives.
//!
//! Release archives are named `<package>-<os>-<arch>-<version>.<ext>`, for
//! example `dbc-linux-amd64-0.1.tar.gz`. Parsing recovers the platform key
//! the archive was built for and the binary version it carries.

use crate::platform::PlatformKey;
use std::fmt;

/// Archive extensions recognised on release assets, longest first.
const ARCHIVE_EXTENSIONS: &[&str] = &[".tar.gz", ".tgz", ".zip"];

/// The components of a platform archive's file name.
///
/// # Examples
///
/// ```
/// use dbc_wheels::release::AssetName;
///
/// let name = AssetName::parse("dbc", "dbc-darwin-arm64-0.2.0-rc1.zip").expect("convention");
/// assert_eq!(name.platform().to_string(), "darwin-arm64");
/// assert_eq!(name.version(), "0.2.0-rc1");
/// assert_eq!(name.to_string(), "dbc-darwin-arm64-0.2.0-rc1.zip");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetName {
    package: String,
    platform: PlatformKey,
    version: String,
    extension: &'static str,
}

impl AssetName {
    /// Parse `file_name` for package `package`.
    ///
    /// Returns `None` when the name does not follow the convention, which is
    /// the case for checksum files and other auxiliary assets.
    #[must_use]
    pub fn parse(package: &str, file_name: &str) -> Option<Self> {
        let rest = file_name.strip_prefix(package)?.strip_prefix('-')?;
        let (stem, extension) = ARCHIVE_EXTENSIONS
            .iter()
            .find_map(|ext| rest.strip_suffix(ext).map(|stem| (stem, *ext)))?;
        let mut parts = stem.splitn(3, '-');
        let os = parts.next().filter(|s| !s.is_empty())?;
        let arch = parts.next().filter(|s| !s.is_empty())?;
        let version = parts.next().filter(|s| !s.is_empty())?;
        Some(Self {
            package: package.to_owned(),
            platform: PlatformKey::new(os, arch),
            version: version.to_owned(),
            extension,
        })
    }

    /// Return the platform the archive was built for.
    #[must_use]
    pub fn platform(&self) -> &PlatformKey {
        &self.platform
    }

    /// Return the binary version embedded in the name.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}{}",
            self.package, self.platform, self.version, self.extension
        )
    }
}
