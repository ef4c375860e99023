//! Uniform iteration over release archives.
//!
//! Release assets ship either as gzip-compressed tarballs or as zip files.
//! [`ArchiveReader`] sniffs the container from its leading bytes and yields
//! every regular file as an [`ArchiveEntry`], so callers never see which
//! container the bytes came from. Iteration is a single forward pass over
//! the input; directories, symlinks and other special entries are skipped.
//! Entries whose path is absolute or climbs out through `..` are rejected
//! rather than skipped, since the archive is not what it claims to be.

use flate2::read::GzDecoder;
use log::debug;
use std::io::{Cursor, Read};
use std::path::{Component, Path};
use thiserror::Error;
use zip::ZipArchive;

/// Leading bytes of a gzip member using the deflate method.
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B, 0x08];

/// Leading bytes of a zip local file header.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Permission bits kept from archive modes.
const PERMISSION_MASK: u32 = 0o7777;

/// File-type bits of a POSIX mode.
const FILE_TYPE_MASK: u32 = 0o170_000;

/// Symlink file type.
const SYMLINK_TYPE: u32 = 0o120_000;

/// Mode reported for zip entries that carry no Unix attributes.
const DEFAULT_MODE: u32 = 0o644;

/// Errors arising while reading a release archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The bytes match neither the gzip nor the zip signature.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// The tar stream, its gzip wrapper, or an entry body is corrupt.
    #[error("error reading archive: {0}")]
    Io(#[from] std::io::Error),

    /// The zip central directory or an entry is corrupt.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry path is absolute or contains `..` components.
    #[error("archive entry escapes its root: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: String,
    },
}

/// The two container formats release archives come in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    /// A tar stream compressed with gzip.
    TarGz,
    /// A zip archive.
    Zip,
}

impl ArchiveFormat {
    /// Detect the container format from the leading bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsupportedFormat`] when neither signature
    /// matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::archive::ArchiveFormat;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::detect(b"PK\x03\x04rest").expect("zip"),
    ///     ArchiveFormat::Zip
    /// );
    /// assert!(ArchiveFormat::detect(b"\x7fELF").is_err());
    /// ```
    pub fn detect(bytes: &[u8]) -> Result<Self, ArchiveError> {
        if bytes.starts_with(GZIP_MAGIC) {
            Ok(Self::TarGz)
        } else if bytes.starts_with(ZIP_MAGIC) {
            Ok(Self::Zip)
        } else {
            Err(ArchiveError::UnsupportedFormat)
        }
    }
}

/// One regular file read from a release archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive, exactly as recorded by the archiver.
    pub path: String,
    /// POSIX permission bits (`0o755`, `0o644`, ...), without file-type bits.
    pub mode: u32,
    /// File contents.
    pub data: Vec<u8>,
}

/// A release archive opened over borrowed bytes.
pub enum ArchiveReader<'a> {
    /// Streaming tar decoder behind a gzip decoder.
    TarGz(tar::Archive<GzDecoder<&'a [u8]>>),
    /// Random-access zip reader.
    Zip(ZipArchive<Cursor<&'a [u8]>>),
}

impl<'a> ArchiveReader<'a> {
    /// Open `bytes`, dispatching on the detected container format.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::UnsupportedFormat`] for unknown signatures or
    /// [`ArchiveError::Zip`] if the zip central directory cannot be read.
    pub fn open(bytes: &'a [u8]) -> Result<Self, ArchiveError> {
        match ArchiveFormat::detect(bytes)? {
            ArchiveFormat::TarGz => Ok(Self::TarGz(tar::Archive::new(GzDecoder::new(bytes)))),
            ArchiveFormat::Zip => Ok(Self::Zip(ZipArchive::new(Cursor::new(bytes))?)),
        }
    }

    /// Return the format this reader decodes.
    #[must_use]
    pub fn format(&self) -> ArchiveFormat {
        match self {
            Self::TarGz(_) => ArchiveFormat::TarGz,
            Self::Zip(_) => ArchiveFormat::Zip,
        }
    }

    /// Start the single pass over the archive's regular files.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Io`] if the tar stream cannot be started,
    /// which includes calling this a second time on a tar reader.
    pub fn entries(&mut self) -> Result<ArchiveEntries<'_, 'a>, ArchiveError> {
        match self {
            Self::TarGz(archive) => Ok(ArchiveEntries::Tar(archive.entries()?)),
            Self::Zip(archive) => Ok(ArchiveEntries::Zip { archive, next: 0 }),
        }
    }
}

/// Lazy iterator over the regular files of an [`ArchiveReader`].
pub enum ArchiveEntries<'r, 'a> {
    /// Entries of a tar stream.
    Tar(tar::Entries<'r, GzDecoder<&'a [u8]>>),
    /// Entries of a zip archive, visited by index.
    Zip {
        /// The zip reader being walked.
        archive: &'r mut ZipArchive<Cursor<&'a [u8]>>,
        /// Index of the next entry to inspect.
        next: usize,
    },
}

impl Iterator for ArchiveEntries<'_, '_> {
    type Item = Result<ArchiveEntry, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Tar(entries) => next_tar_entry(entries),
            Self::Zip { archive, next } => next_zip_entry(archive, next),
        }
    }
}

fn next_tar_entry(
    entries: &mut tar::Entries<'_, GzDecoder<&[u8]>>,
) -> Option<Result<ArchiveEntry, ArchiveError>> {
    for item in entries.by_ref() {
        let mut entry = match item {
            Ok(entry) => entry,
            Err(e) => return Some(Err(e.into())),
        };
        let path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if !entry.header().entry_type().is_file() {
            debug!("skipping non-regular tar entry {path}");
            continue;
        }
        if let Err(e) = validate_entry_path(&path) {
            return Some(Err(e));
        }
        return Some(read_tar_entry(&mut entry, path));
    }
    None
}

fn read_tar_entry(
    entry: &mut tar::Entry<'_, GzDecoder<&[u8]>>,
    path: String,
) -> Result<ArchiveEntry, ArchiveError> {
    let mode = entry.header().mode()? & PERMISSION_MASK;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(ArchiveEntry { path, mode, data })
}

fn next_zip_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    next: &mut usize,
) -> Option<Result<ArchiveEntry, ArchiveError>> {
    while *next < archive.len() {
        let index = *next;
        *next += 1;
        let mut file = match archive.by_index(index) {
            Ok(file) => file,
            Err(e) => return Some(Err(e.into())),
        };
        // `unix_mode` is the upper half of the external attributes.
        let raw_mode = file.unix_mode();
        if file.is_dir() || raw_mode.is_some_and(|m| m & FILE_TYPE_MASK == SYMLINK_TYPE) {
            debug!("skipping non-regular zip entry {}", file.name());
            continue;
        }
        let path = file.name().to_owned();
        if let Err(e) = validate_entry_path(&path) {
            return Some(Err(e));
        }
        let mode = raw_mode.map_or(DEFAULT_MODE, |m| m & PERMISSION_MASK);
        let mut data = Vec::new();
        if let Err(e) = file.read_to_end(&mut data) {
            return Some(Err(ArchiveError::Io(e)));
        }
        return Some(Ok(ArchiveEntry { path, mode, data }));
    }
    None
}

/// Reject entry paths that are absolute or step out through `..`.
///
/// Separators are checked in both styles because zip names written on
/// Windows may use backslashes.
fn validate_entry_path(path: &str) -> Result<(), ArchiveError> {
    let escapes = path.starts_with(['/', '\\'])
        || Path::new(path).components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        })
        || path.split(['/', '\\']).any(|segment| segment == "..");
    if escapes {
        return Err(ArchiveError::PathTraversal {
            path: path.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FixtureFile, tar_gz_archive, zip_archive};
    use rstest::rstest;

    fn sample_files() -> Vec<FixtureFile> {
        vec![
            FixtureFile::new("a", 0o755, b"x"),
            FixtureFile::new("LICENSE", 0o644, b"y"),
        ]
    }

    fn collect(bytes: &[u8]) -> Vec<ArchiveEntry> {
        let mut reader = ArchiveReader::open(bytes).expect("open archive");
        reader
            .entries()
            .expect("entries")
            .collect::<Result<Vec<_>, _>>()
            .expect("read entries")
    }

    #[rstest]
    #[case::tar_gz(ArchiveFormat::TarGz)]
    #[case::zip(ArchiveFormat::Zip)]
    fn yields_uniform_entries(#[case] format: ArchiveFormat) {
        let files = sample_files();
        let bytes = match format {
            ArchiveFormat::TarGz => tar_gz_archive(&files),
            ArchiveFormat::Zip => zip_archive(&files),
        };
        assert_eq!(ArchiveFormat::detect(&bytes).expect("known format"), format);

        let entries = collect(&bytes);
        assert_eq!(
            entries,
            vec![
                ArchiveEntry {
                    path: "a".to_owned(),
                    mode: 0o755,
                    data: b"x".to_vec(),
                },
                ArchiveEntry {
                    path: "LICENSE".to_owned(),
                    mode: 0o644,
                    data: b"y".to_vec(),
                },
            ]
        );
    }

    #[rstest]
    #[case::elf(b"\x7fELF\x02\x01")]
    #[case::empty(b"")]
    #[case::gzip_without_deflate(b"\x1f\x8b\x00\x00")]
    #[case::truncated_zip(b"PK\x03")]
    fn rejects_unknown_signatures(#[case] bytes: &[u8]) {
        assert!(matches!(
            ArchiveReader::open(bytes),
            Err(ArchiveError::UnsupportedFormat)
        ));
    }

    #[test]
    fn skips_tar_directories() {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Directory);
        header.set_mode(0o755);
        header.set_size(0);
        header.set_cksum();
        builder
            .append_data(&mut header, "bin/", std::io::empty())
            .expect("append dir");
        let tar = builder.into_inner().expect("finish tar");
        let bytes = crate::test_utils::gzip(&tar);

        assert!(collect(&bytes).is_empty());
    }

    #[test]
    fn skips_zip_directories() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .add_directory("bin/", zip::write::SimpleFileOptions::default())
            .expect("add dir");
        let bytes = writer.finish().expect("finish zip").into_inner();

        assert!(collect(&bytes).is_empty());
    }

    #[rstest]
    #[case::parent("../../evil.pth")]
    #[case::nested_parent("bin/../../evil.pth")]
    #[case::absolute("/etc/abs")]
    #[case::backslash_parent("..\\evil.pth")]
    fn validate_entry_path_rejects_escaping_paths(#[case] path: &str) {
        assert!(matches!(
            validate_entry_path(path),
            Err(ArchiveError::PathTraversal { path: ref p }) if p == path
        ));
    }

    #[rstest]
    #[case::plain("dbc_linux_amd64")]
    #[case::nested("share/doc/LICENSE")]
    #[case::dotted_name("..hidden")]
    #[case::current_dir("./dbc")]
    fn validate_entry_path_accepts_contained_paths(#[case] path: &str) {
        assert!(validate_entry_path(path).is_ok());
    }

    #[rstest]
    #[case::tar_gz_parent(ArchiveFormat::TarGz, "../../evil.pth")]
    #[case::tar_gz_absolute(ArchiveFormat::TarGz, "/etc/abs")]
    #[case::zip_parent(ArchiveFormat::Zip, "../../evil.pth")]
    #[case::zip_absolute(ArchiveFormat::Zip, "/etc/abs")]
    fn escaping_entries_fail_iteration(#[case] format: ArchiveFormat, #[case] bad: &str) {
        let mut files = sample_files();
        files.push(FixtureFile::new(bad, 0o644, b"import os"));
        let bytes = match format {
            ArchiveFormat::TarGz => tar_gz_archive(&files),
            ArchiveFormat::Zip => zip_archive(&files),
        };
        let mut reader = ArchiveReader::open(&bytes).expect("open archive");
        let outcome: Result<Vec<_>, _> = reader.entries().expect("entries").collect();
        assert!(matches!(
            outcome,
            Err(ArchiveError::PathTraversal { ref path }) if path == bad
        ));
    }

    #[test]
    fn tar_entries_cannot_be_restarted() {
        let bytes = tar_gz_archive(&sample_files());
        let mut reader = ArchiveReader::open(&bytes).expect("open");
        let first: Vec<_> = reader.entries().expect("first pass").collect();
        assert_eq!(first.len(), 2);
        assert!(reader.entries().is_err(), "a tar stream is single-pass");
    }

    #[test]
    fn corrupt_gzip_surfaces_an_error() {
        let mut bytes = GZIP_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xFF; 32]);
        let mut reader = ArchiveReader::open(&bytes).expect("signature matches");
        let outcome: Result<Vec<_>, _> = match reader.entries() {
            Ok(entries) => entries.collect(),
            Err(e) => Err(e),
        };
        assert!(outcome.is_err());
    }
}
