//! User-facing progress lines.
//!
//! Progress goes to a caller-supplied writer (stderr in the binary) and is
//! separate from `log` output, which is for diagnostics.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;

/// Write one line, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Progress is best-effort.
    }
}

/// Announce that a wheel is being built from `asset`.
#[must_use]
pub fn creating_message(asset: &str) -> String {
    format!("Creating wheel for asset: {asset}...")
}

/// Announce a written wheel.
#[must_use]
pub fn created_message(path: &Path) -> String {
    format!("Created wheel {}.", path.display())
}

/// Announce an asset skipped because its platform was not selected.
#[must_use]
pub fn skipped_message(asset: &str) -> String {
    format!("Skipped {asset} because it wasn't in the provided list of platforms.")
}

/// Announce an asset ignored because an earlier asset covers its platform.
#[must_use]
pub fn duplicate_message(asset: &str, platform: impl Display) -> String {
    format!("Skipped {asset} because a wheel for {platform} is already being built.")
}

/// Announce a platform whose wheel could not be built.
#[must_use]
pub fn failed_message(platform: impl Display, err: impl Display) -> String {
    format!("Failed to create wheel for {platform}: {err}")
}
