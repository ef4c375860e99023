//! The fetch, verify, assemble and write pipeline.
//!
//! A release run selects platforms first, so an unknown platform fails
//! before any request is made. It then resolves the release and treats
//! each selected asset as an independent unit of work: a failure is logged
//! and recorded in the [`BuildReport`] while the remaining platforms carry
//! on. Wheels already written are never touched by later failures.
//!
//! The resolver and fetcher are trait objects so tests can drive the
//! pipeline without a network.
//!
//! A platform is built at most once per run: when a release carries several
//! archives for one platform, the first in release order is used.

use crate::config::PackageConfig;
use crate::download::{AssetFetcher, fetch_and_verify};
use crate::error::{PipelineError, Result};
use crate::output::{
    created_message, creating_message, duplicate_message, failed_message, skipped_message,
    write_stderr_line,
};
use crate::platform::{PlatformKey, PlatformSelector, PlatformTable, PlatformTag};
use crate::release::{Asset, AssetName, ReleaseResolver};
use crate::wheel::{AssemblyContext, assemble_archive, write_package};
use camino::Utf8Path;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

/// What to build from a hosted release.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseRequest<'a> {
    /// Release tag; asset versions must match it.
    pub binary_version: &'a str,
    /// Version given to the wheels.
    pub wheel_version: &'a str,
    /// Platforms to build.
    pub platforms: &'a PlatformSelector,
}

/// Outcome of a release run, one entry per attempted platform.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Wheels written, by platform.
    pub built: Vec<(PlatformKey, PathBuf)>,
    /// Platforms whose wheel could not be built.
    pub failed: Vec<(PlatformKey, PipelineError)>,
    /// Selected platforms the release has no asset for.
    pub missing: Vec<PlatformKey>,
}

impl BuildReport {
    /// Return the written wheels, or an error if any platform failed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Incomplete`] when at least one platform
    /// failed; individual failures were already reported during the run.
    pub fn into_result(self) -> Result<Vec<PathBuf>> {
        if self.failed.is_empty() {
            return Ok(self.built.into_iter().map(|(_, path)| path).collect());
        }
        Err(PipelineError::Incomplete {
            failed: self.failed.len(),
            total: self.failed.len() + self.built.len(),
        })
    }
}

/// Builds wheels from release archives.
pub struct Pipeline<'a> {
    config: &'a PackageConfig,
    resolver: &'a dyn ReleaseResolver,
    fetcher: &'a dyn AssetFetcher,
    table: PlatformTable,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over the default platform table.
    #[must_use]
    pub fn new(
        config: &'a PackageConfig,
        resolver: &'a dyn ReleaseResolver,
        fetcher: &'a dyn AssetFetcher,
    ) -> Self {
        Self {
            config,
            resolver,
            fetcher,
            table: PlatformTable::default(),
        }
    }

    /// Replace the platform table.
    #[must_use]
    pub fn with_table(mut self, table: PlatformTable) -> Self {
        self.table = table;
        self
    }

    /// Build one wheel per selected platform from the release tagged
    /// `request.binary_version`.
    ///
    /// Progress lines are written to `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::PlatformMapping`] if the selector names an
    /// unsupported platform or selects nothing, and
    /// [`PipelineError::Resolution`] if the release cannot be resolved.
    /// Per-platform failures are reported in the [`BuildReport`].
    pub fn build_release(
        &self,
        request: &ReleaseRequest<'_>,
        progress: &mut dyn Write,
    ) -> Result<BuildReport> {
        let selected = self.table.select(request.platforms)?;
        debug!(
            "selected platforms: {}",
            selected
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let config = self.config;
        let release =
            self.resolver
                .resolve(&config.github_org, &config.github_repo, request.binary_version)?;
        info!(
            "resolved release {} with {} assets",
            release.tag_name,
            release.assets.len()
        );

        let mut report = BuildReport::default();
        let mut covered = BTreeSet::new();
        for asset in &release.assets {
            let Some(name) = AssetName::parse(&config.package_name, &asset.name) else {
                debug!("skipping {}: not a platform archive", asset.name);
                continue;
            };
            let key = name.platform().clone();
            if !selected.contains(&key) {
                write_stderr_line(progress, skipped_message(&asset.name));
                continue;
            }
            if !covered.insert(key.clone()) {
                warn!("ignoring {}: release already has an archive for {key}", asset.name);
                write_stderr_line(progress, duplicate_message(&asset.name, &key));
                continue;
            }
            match self.build_asset(asset, &name, request, progress) {
                Ok(path) => {
                    write_stderr_line(progress, created_message(&path));
                    report.built.push((key, path));
                }
                Err(err) => {
                    warn!("wheel for {} failed: {err}", asset.name);
                    write_stderr_line(progress, failed_message(&key, &err));
                    report.failed.push((key, err));
                }
            }
        }

        report.missing = selected
            .into_iter()
            .filter(|key| !covered.contains(key))
            .collect();
        for key in &report.missing {
            warn!("release {} has no asset for {key}", release.tag_name);
        }
        Ok(report)
    }

    /// Build a wheel from an archive on disk, without resolution or digest
    /// verification.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AmbiguousPlatform`] unless `platforms` is a
    /// single exact key, [`PipelineError::PlatformMapping`] if that key is
    /// unsupported, [`PipelineError::Io`] if the archive cannot be read,
    /// and any assembly or write error.
    pub fn build_local(
        &self,
        archive: &Utf8Path,
        platforms: &PlatformSelector,
        wheel_version: &str,
        progress: &mut dyn Write,
    ) -> Result<PathBuf> {
        let key = platforms
            .exact_key()
            .ok_or_else(|| PipelineError::AmbiguousPlatform {
                selector: platforms.to_string(),
            })?;
        let tag = self.table.map(&key)?;
        let bytes = std::fs::read(archive).map_err(|source| PipelineError::Io {
            path: archive.to_owned(),
            source,
        })?;
        write_stderr_line(progress, creating_message(archive.as_str()));
        let path = self.write_wheel(wheel_version, &tag, &bytes)?;
        write_stderr_line(progress, created_message(&path));
        Ok(path)
    }

    fn build_asset(
        &self,
        asset: &Asset,
        name: &AssetName,
        request: &ReleaseRequest<'_>,
        progress: &mut dyn Write,
    ) -> Result<PathBuf> {
        if name.version() != request.binary_version {
            return Err(PipelineError::VersionMismatch {
                asset: asset.name.clone(),
                expected: request.binary_version.to_owned(),
                actual: name.version().to_owned(),
            });
        }
        let tag = self.table.map(name.platform())?;
        write_stderr_line(progress, creating_message(&asset.name));
        let bytes = fetch_and_verify(self.fetcher, asset)?;
        self.write_wheel(request.wheel_version, &tag, &bytes)
    }

    fn write_wheel(&self, version: &str, tag: &PlatformTag, bytes: &[u8]) -> Result<PathBuf> {
        let ctx = AssemblyContext {
            config: self.config,
            version,
        };
        let descriptor = assemble_archive(ctx, tag, bytes)?;
        let path = write_package(self.config.out_dir.as_std_path(), &descriptor)?;
        info!("created wheel {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
