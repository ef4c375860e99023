//! Assembly of a [`PackageDescriptor`] from release archive entries.
//!
//! Every archive entry is copied under the package directory with its mode.
//! The first entry whose path starts with the configured binary prefix gets
//! a launcher; required license files are also copied into the dist-info
//! `licenses/` directory. Assembly fails without producing anything when the
//! binary or a license is missing, or when the archive ships a file at one
//! of the paths the generated package owns.

use crate::archive::{ArchiveEntry, ArchiveError, ArchiveReader};
use crate::config::PackageConfig;
use crate::platform::PlatformTag;
use crate::wheel::descriptor::{PackageDescriptor, PackageFile};
use crate::wheel::launcher::{LauncherStrategy, render_launcher};
use crate::wheel::metadata::{entry_points, metadata_headers, wheel_headers};
use crate::wheel::naming::WheelName;
use camino::Utf8PathBuf;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Package-root files generated by the assembler.
const RESERVED_PATHS: &[&str] = &["__init__.py", "__main__.py"];

/// Errors arising while assembling a wheel.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// The source archive could not be read.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// No entry starts with the binary prefix.
    #[error("no binary found in archive (expected an entry starting with \"{prefix}\")")]
    BinaryNotFound {
        /// The prefix that was searched for.
        prefix: String,
    },

    /// Required license files are absent from the archive.
    #[error("missing licenses: {}", missing.join(", "))]
    LicenseMissing {
        /// Names of the missing files, sorted.
        missing: Vec<String>,
    },

    /// An archive entry would replace a generated package file.
    #[error("archive entry {path} collides with a generated package file")]
    ReservedPath {
        /// The colliding entry path.
        path: String,
    },

    /// The long description could not be read.
    #[error("failed to read description {path}: {source}")]
    Description {
        /// The description file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Inputs shared by every wheel of one run.
#[derive(Debug, Clone, Copy)]
pub struct AssemblyContext<'a> {
    /// Package configuration.
    pub config: &'a PackageConfig,
    /// Version given to the wheel.
    pub version: &'a str,
}

/// Assemble a wheel for `platform` from archive `entries`.
///
/// # Errors
///
/// Returns [`AssemblyError`] if an entry cannot be read or collides with a
/// generated file, no binary is found, the description cannot be read, or
/// a license is missing.
pub fn assemble<I>(
    ctx: AssemblyContext<'_>,
    platform: &PlatformTag,
    entries: I,
) -> Result<PackageDescriptor, AssemblyError>
where
    I: IntoIterator<Item = Result<ArchiveEntry, ArchiveError>>,
{
    let config = ctx.config;
    let import_name = config.import_name();
    let package = import_name.as_str();
    let name = WheelName::new(config.package_name.as_str(), ctx.version, platform.clone());
    let mut files = BTreeMap::new();
    files.insert(format!("{package}/__init__.py"), PackageFile::new(""));

    let mut licenses: BTreeMap<String, Vec<u8>> = BTreeMap::new();
    let mut binary: Option<String> = None;
    for entry in entries {
        let ArchiveEntry { path, mode, data } = entry?;
        if path.is_empty() {
            continue;
        }
        if RESERVED_PATHS.contains(&path.as_str()) {
            return Err(AssemblyError::ReservedPath { path });
        }
        debug!("adding {path} (mode {mode:o})");
        if config.required_licenses.contains(&path) {
            licenses.insert(path.clone(), data.clone());
        }
        if binary.is_none() && path.starts_with(config.binary_prefix.as_str()) {
            binary = Some(path.clone());
        }
        files.insert(format!("{package}/{path}"), PackageFile::with_mode(data, mode));
    }

    let binary = binary.ok_or_else(|| AssemblyError::BinaryNotFound {
        prefix: config.binary_prefix.clone(),
    })?;
    debug!("using {binary} as the binary");
    let strategy = LauncherStrategy::for_platform(platform);
    files.insert(
        format!("{package}/__main__.py"),
        PackageFile::new(render_launcher(&binary, strategy)),
    );

    let description = std::fs::read_to_string(&config.description_path).map_err(|source| {
        AssemblyError::Description {
            path: config.description_path.clone(),
            source,
        }
    })?;

    let found: BTreeSet<&String> = licenses.keys().collect();
    let missing: Vec<String> = config
        .required_licenses
        .iter()
        .filter(|required| !found.contains(required))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing.is_empty() {
        return Err(AssemblyError::LicenseMissing { missing });
    }
    let dist_info = name.dist_info();
    for (license, data) in licenses {
        files.insert(
            format!("{dist_info}/licenses/{license}"),
            PackageFile::new(data),
        );
    }

    Ok(PackageDescriptor {
        metadata: metadata_headers(config, &name),
        wheel: wheel_headers(&name),
        entry_points: entry_points(&config.package_name, package),
        description,
        files,
        name,
    })
}

/// Open `bytes` as a release archive and assemble a wheel from it.
///
/// # Errors
///
/// Returns [`AssemblyError::Archive`] for unsupported or corrupt archives,
/// otherwise as [`assemble`].
pub fn assemble_archive(
    ctx: AssemblyContext<'_>,
    platform: &PlatformTag,
    bytes: &[u8],
) -> Result<PackageDescriptor, AssemblyError> {
    let mut reader = ArchiveReader::open(bytes)?;
    debug!("reading {:?} archive", reader.format());
    assemble(ctx, platform, reader.entries()?)
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
