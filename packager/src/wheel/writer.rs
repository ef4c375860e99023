//! Reproducible wheel serialisation.
//!
//! Every member passes through a normalisation callback that fixes its
//! compression, timestamp and permissions before the zip encoder sees it.
//! The default callback pins the timestamp to 1980-01-01 and derives the
//! mode from the descriptor alone, so two writes of equal descriptors
//! produce identical bytes. Wheels are written to a temporary file in the
//! output directory and renamed into place, so a failed write never leaves
//! a partial wheel behind.

use crate::wheel::descriptor::PackageDescriptor;
use crate::wheel::record::render_record;
use log::debug;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Mode for members without an explicit mode.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Mode given to RECORD.
pub const RECORD_FILE_MODE: u32 = 0o664;

/// Errors arising while writing a wheel.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Creating the output directory or the wheel file failed.
    #[error("I/O error writing wheel: {0}")]
    Io(#[from] std::io::Error),

    /// The zip encoder rejected a member.
    #[error("zip encoding error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The finished wheel could not be moved into place.
    #[error("failed to move wheel into {path}: {source}")]
    Persist {
        /// The final wheel path.
        path: PathBuf,
        /// The underlying rename error.
        #[source]
        source: std::io::Error,
    },
}

/// Default normalisation: deflate, fixed 1980 timestamp, and the explicit
/// mode or a default that depends only on the member path.
///
/// # Examples
///
/// ```
/// use dbc_wheels::wheel::writer::reproducible_options;
/// use std::io::{Cursor, Write};
///
/// let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
/// zip.start_file("dbc/dbc_linux_amd64", reproducible_options("dbc/dbc_linux_amd64", Some(0o755)))
///     .expect("start member");
/// zip.write_all(b"#!fakebin").expect("write member");
/// let mut archive = zip::ZipArchive::new(zip.finish().expect("finish")).expect("read back");
/// let member = archive.by_index(0).expect("member");
/// assert_eq!(member.compression(), zip::CompressionMethod::Deflated);
/// assert_eq!(member.unix_mode().map(|mode| mode & 0o777), Some(0o755));
/// ```
#[must_use]
pub fn reproducible_options(path: &str, mode: Option<u32>) -> SimpleFileOptions {
    let mode = mode.unwrap_or_else(|| {
        if path.ends_with("/RECORD") {
            RECORD_FILE_MODE
        } else {
            DEFAULT_FILE_MODE
        }
    });
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(mode)
}

/// Encode `descriptor` into `sink`, applying `normalize` to every member
/// including RECORD, which is written last.
///
/// # Errors
///
/// Returns [`WriteError`] if the zip encoder or the sink fails.
pub fn encode_package<W, F>(
    sink: W,
    descriptor: &PackageDescriptor,
    normalize: F,
) -> Result<W, WriteError>
where
    W: Write + Seek,
    F: Fn(&str, Option<u32>) -> SimpleFileOptions,
{
    let entries = descriptor.entries();
    let record_path = format!("{}/RECORD", descriptor.name.dist_info());
    let record = render_record(
        entries.iter().map(|(path, file)| (path.as_str(), file.data.as_slice())),
        &record_path,
    );

    let mut zip = ZipWriter::new(sink);
    for (path, file) in &entries {
        zip.start_file(path.as_str(), normalize(path, file.mode))?;
        zip.write_all(&file.data)?;
    }
    zip.start_file(record_path.as_str(), normalize(&record_path, None))?;
    zip.write_all(record.as_bytes())?;
    Ok(zip.finish()?)
}

/// Write `descriptor` into `out_dir` with [`reproducible_options`].
///
/// # Errors
///
/// Returns [`WriteError`] if the directory cannot be created or the wheel
/// cannot be encoded or moved into place.
pub fn write_package(out_dir: &Path, descriptor: &PackageDescriptor) -> Result<PathBuf, WriteError> {
    write_package_with(out_dir, descriptor, reproducible_options)
}

/// Write `descriptor` into `out_dir`, normalising members with `normalize`.
///
/// Returns the path of the written wheel.
///
/// # Errors
///
/// Returns [`WriteError`] if the directory cannot be created or the wheel
/// cannot be encoded or moved into place.
pub fn write_package_with<F>(
    out_dir: &Path,
    descriptor: &PackageDescriptor,
    normalize: F,
) -> Result<PathBuf, WriteError>
where
    F: Fn(&str, Option<u32>) -> SimpleFileOptions,
{
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(descriptor.name.filename());
    let partial = tempfile::Builder::new()
        .prefix(".dbc-wheel-")
        .suffix(".part")
        .tempfile_in(out_dir)?;
    let partial = encode_package(partial, descriptor, normalize)?;
    partial.persist(&path).map_err(|e| WriteError::Persist {
        path: path.clone(),
        source: e.error,
    })?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(DEFAULT_FILE_MODE))?;
    }
    debug!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
