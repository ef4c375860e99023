//! Shared test utilities for the packager crate.
//!
//! Builds real gzip-compressed tarballs and zip archives in memory so that
//! tests exercise the same decoders production uses, and fabricates release
//! API bodies in the shape the resolver parses.

use flate2::Compression;
use flate2::write::GzEncoder;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};

/// A file to place into a fixture archive.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    /// Path inside the archive.
    pub path: String,
    /// POSIX permission bits.
    pub mode: u32,
    /// File contents.
    pub data: Vec<u8>,
}

impl FixtureFile {
    /// Create a fixture file description.
    pub fn new(path: &str, mode: u32, data: &[u8]) -> Self {
        Self {
            path: path.to_owned(),
            mode,
            data: data.to_vec(),
        }
    }
}

/// The files of the canonical dbc release archive: the binary and its
/// license.
pub fn dbc_release_files() -> Vec<FixtureFile> {
    vec![
        FixtureFile::new("dbc_linux_amd64", 0o755, b"#!fakebin"),
        FixtureFile::new("LICENSE", 0o644, b"Apache-2.0 text"),
    ]
}

/// Gzip-compress `data` with a zeroed header timestamp.
///
/// # Panics
///
/// Panics if the in-memory encoder fails, which only happens on allocation
/// failure.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("write gzip body");
    encoder.finish().expect("finish gzip stream")
}

/// Build a `.tar.gz` archive containing `files` in order.
///
/// Paths are copied into the header verbatim, so fixtures may hold absolute
/// or `..` names that the tar builder would refuse to write.
///
/// # Panics
///
/// Panics if a path does not fit the 100-byte name field or the in-memory
/// tar builder fails.
pub fn tar_gz_archive(files: &[FixtureFile]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for file in files {
        let mut header = tar::Header::new_gnu();
        let name = &mut header.as_old_mut().name;
        assert!(file.path.len() < name.len(), "fixture path too long: {}", file.path);
        for (slot, byte) in name.iter_mut().zip(file.path.bytes()) {
            *slot = byte;
        }
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(file.mode);
        header.set_size(file.data.len() as u64);
        header.set_mtime(0);
        header.set_cksum();
        builder
            .append(&header, file.data.as_slice())
            .expect("append tar entry");
    }
    let tar = builder.into_inner().expect("finish tar stream");
    gzip(&tar)
}

/// Build a `.zip` archive containing `files` in order.
///
/// # Panics
///
/// Panics if the in-memory zip writer fails.
pub fn zip_archive(files: &[FixtureFile]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for file in files {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(file.mode);
        writer
            .start_file(file.path.as_str(), options)
            .expect("start zip entry");
        writer.write_all(&file.data).expect("write zip entry");
    }
    writer.finish().expect("finish zip archive").into_inner()
}

/// Return the lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Build a release API body with one asset per `(name, bytes)` pair, each
/// carrying the correct `sha256:` digest.
pub fn release_json(tag: &str, assets: &[(&str, &[u8])]) -> String {
    let assets: Vec<serde_json::Value> = assets
        .iter()
        .map(|(name, bytes)| {
            serde_json::json!({
                "name": name,
                "browser_download_url": format!("https://example.test/download/{tag}/{name}"),
                "digest": format!("sha256:{}", sha256_hex(bytes)),
                "size": bytes.len(),
            })
        })
        .collect();
    serde_json::json!({
        "tag_name": tag,
        "name": format!("dbc {tag}"),
        "published_at": "2025-07-01T12:00:00Z",
        "assets": assets,
    })
    .to_string()
}
