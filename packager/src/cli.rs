//! CLI argument definitions for the wheel builder.
//!
//! Kept apart from the binary entrypoint so parsing can be unit tested.

use crate::platform::PlatformSelector;
use camino::Utf8PathBuf;
use clap::Parser;
use log::LevelFilter;

/// Repackage dbc release binaries as Python wheels.
#[derive(Parser, Debug, Clone)]
#[command(name = "dbc-wheels")]
#[command(version, about)]
#[command(long_about = concat!(
    "Repackage dbc release binaries as platform-tagged Python wheels.\n\n",
    "Each selected platform's release archive is downloaded, verified against ",
    "the digest published with the release, and rewritten as a wheel whose ",
    "console script runs the bundled binary. Identical inputs produce ",
    "byte-identical wheels.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Build wheels for every platform of release 0.1:\n",
    "    $ dbc-wheels --binary-version 0.1\n\n",
    "  Build only the amd64 wheels:\n",
    "    $ dbc-wheels --binary-version 0.1 --platform amd64\n\n",
    "  Publish a packaging fix without a new binary release:\n",
    "    $ dbc-wheels --binary-version 0.1 --wheel-version 0.1.post1\n\n",
    "  Package a local archive:\n",
    "    $ dbc-wheels --binary-version 0.1 --platform linux-amd64 --archive dbc.tar.gz\n\n",
    "Set GITHUB_TOKEN to authenticate release lookups.",
))]
pub struct Cli {
    /// Release tag of the binary to package.
    #[arg(long, alias = "binary_version", value_name = "TAG")]
    pub binary_version: String,

    /// Version to give the wheels [default: the binary version].
    #[arg(long, alias = "wheel_version", value_name = "VERSION")]
    pub wheel_version: Option<String>,

    /// Platforms to build: `all`, or comma-separated `<os>-<arch>` keys,
    /// OS names, or architectures.
    #[arg(short, long, value_name = "PLATFORMS", default_value = "all")]
    pub platform: PlatformSelector,

    /// Package this local archive instead of downloading the release.
    #[arg(long, value_name = "FILE")]
    pub archive: Option<Utf8PathBuf>,

    /// Directory receiving the wheels [default: ./dist].
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<Utf8PathBuf>,

    /// TOML file overriding the packaging configuration.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Increase log verbosity (repeatable).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Return the version the wheels are named with.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use dbc_wheels::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["dbc-wheels", "--binary-version", "0.1"]);
    /// assert_eq!(cli.wheel_version(), "0.1");
    /// ```
    #[must_use]
    pub fn wheel_version(&self) -> &str {
        self.wheel_version.as_deref().unwrap_or(&self.binary_version)
    }

    /// Return the default log level implied by `-v` and `-q`.
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match (self.quiet, self.verbosity) {
            (true, _) => LevelFilter::Warn,
            (false, 0) => LevelFilter::Info,
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
