//! Repackage dbc release binaries as platform-tagged Python wheels.
//!
//! The crate resolves a hosted release, downloads each platform archive,
//! verifies it against the published digest, and rewrites its contents as
//! a wheel whose console script runs the bundled binary. Serialisation is
//! reproducible: identical inputs give byte-identical wheels.
//!
//! # Modules
//!
//! - [`archive`] - Uniform iteration over tar.gz and zip release archives
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Packaging configuration and its TOML loader
//! - [`download`] - HTTP retrieval and verified asset downloads
//! - [`error`] - Pipeline error taxonomy
//! - [`output`] - User-facing progress lines
//! - [`pipeline`] - Orchestration of one run across platforms
//! - [`platform`] - Platform keys, wheel platform tags, and selection
//! - [`release`] - Release records, asset names, and release lookup
//! - [`verification`] - Digest verification of downloaded assets
//! - [`wheel`] - Wheel assembly and reproducible writing

pub mod archive;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod release;
pub mod verification;
pub mod wheel;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
