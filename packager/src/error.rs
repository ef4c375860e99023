//! Top-level error taxonomy for the packaging pipeline.
//!
//! Each module reports failures through its own error enum;
//! [`PipelineError`] regroups them by what went wrong so callers can tell
//! an integrity failure from a missing license without inspecting sources.

use crate::archive::ArchiveError;
use crate::config::ConfigError;
use crate::download::{DownloadError, FetchError};
use crate::platform::PlatformError;
use crate::release::ResolveError;
use crate::verification::IntegrityError;
use crate::wheel::{AssemblyError, WriteError};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a unit of packaging work.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The release could not be found or fetched.
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// Downloaded bytes failed digest verification.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// The archive is not a supported container or is corrupt.
    #[error(transparent)]
    Format(#[from] ArchiveError),

    /// No archive entry is the binary.
    #[error("no binary found in archive (expected an entry starting with \"{prefix}\")")]
    BinaryNotFound {
        /// The binary prefix that was searched for.
        prefix: String,
    },

    /// Required license files are absent from the archive.
    #[error("missing licenses: {}", missing.join(", "))]
    LicenseMissing {
        /// Names of the missing files.
        missing: Vec<String>,
    },

    /// The archive ships a file the generated package owns.
    #[error("archive entry {path} collides with a generated package file")]
    ReservedPath {
        /// The colliding entry path.
        path: String,
    },

    /// The requested platform is unknown or malformed.
    #[error(transparent)]
    PlatformMapping(#[from] PlatformError),

    /// The asset's version disagrees with the requested binary version.
    #[error("version mismatch for {asset}: {actual} != {expected}")]
    VersionMismatch {
        /// Name of the offending asset.
        asset: String,
        /// The requested binary version.
        expected: String,
        /// The version parsed from the asset name.
        actual: String,
    },

    /// Local archive mode needs one exact platform.
    #[error("--archive requires --platform to name exactly one <os>-<arch> platform, got \"{selector}\"")]
    AmbiguousPlatform {
        /// The selector that was given.
        selector: String,
    },

    /// A local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The wheel could not be written.
    #[error(transparent)]
    Write(#[from] WriteError),

    /// An asset body could not be downloaded.
    #[error(transparent)]
    Fetch(#[from] DownloadError),

    /// Some selected platforms failed; each was reported as it happened.
    #[error("{failed} of {total} wheels failed")]
    Incomplete {
        /// Number of failed platforms.
        failed: usize,
        /// Number of attempted platforms.
        total: usize,
    },
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Download(e) => Self::Fetch(e),
            FetchError::Integrity(e) => Self::Integrity(e),
        }
    }
}

impl From<AssemblyError> for PipelineError {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::Archive(e) => Self::Format(e),
            AssemblyError::BinaryNotFound { prefix } => Self::BinaryNotFound { prefix },
            AssemblyError::LicenseMissing { missing } => Self::LicenseMissing { missing },
            AssemblyError::ReservedPath { path } => Self::ReservedPath { path },
            AssemblyError::Description { path, source } => Self::Io { path, source },
        }
    }
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, PipelineError>;
