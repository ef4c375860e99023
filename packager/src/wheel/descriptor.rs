//! The assembled description of one wheel.
//!
//! A [`PackageDescriptor`] is fully determined before serialisation begins:
//! its files are held in a sorted map and its metadata files are rendered on
//! demand, so the writer has no decisions left to make beyond encoding.

use crate::platform::PlatformTag;
use crate::wheel::metadata::{Header, render_message};
use crate::wheel::naming::WheelName;
use std::collections::BTreeMap;

/// Contents and optional explicit mode of one file in the wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFile {
    /// File contents.
    pub data: Vec<u8>,
    /// Explicit permission bits; `None` takes the writer's default.
    pub mode: Option<u32>,
}

impl PackageFile {
    /// A file with the default mode.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            mode: None,
        }
    }

    /// A file with explicit permission bits.
    #[must_use]
    pub fn with_mode(data: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self {
            data: data.into(),
            mode: Some(mode),
        }
    }
}

/// Everything needed to write one wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Name, version and platform tag.
    pub name: WheelName,
    /// METADATA headers in output order.
    pub metadata: Vec<Header>,
    /// METADATA body: the long description.
    pub description: String,
    /// WHEEL headers in output order.
    pub wheel: Vec<Header>,
    /// Contents of `entry_points.txt`.
    pub entry_points: String,
    /// Package files and copied license files keyed by wheel path.
    pub files: BTreeMap<String, PackageFile>,
}

impl PackageDescriptor {
    /// Return the platform tag the wheel is built for.
    #[must_use]
    pub fn platform_tag(&self) -> &PlatformTag {
        self.name.platform()
    }

    /// Return every wheel member except RECORD, in output order.
    ///
    /// Package files come first, then `.dist-info` members. Each group is
    /// sorted by path, so the order does not depend on how the source
    /// archive listed its entries.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, PackageFile)> {
        let dist_info = self.name.dist_info();
        let prefix = format!("{dist_info}/");
        let mut meta: BTreeMap<String, PackageFile> = BTreeMap::new();
        meta.insert(
            format!("{prefix}METADATA"),
            PackageFile::new(render_message(&self.metadata, Some(&self.description))),
        );
        meta.insert(
            format!("{prefix}WHEEL"),
            PackageFile::new(render_message(&self.wheel, None)),
        );
        meta.insert(
            format!("{prefix}entry_points.txt"),
            PackageFile::new(self.entry_points.as_str()),
        );

        let mut package = Vec::new();
        for (path, file) in &self.files {
            if path.starts_with(&prefix) {
                meta.insert(path.clone(), file.clone());
            } else {
                package.push((path.clone(), file.clone()));
            }
        }
        package.extend(meta);
        package
    }
}
