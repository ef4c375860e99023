//! Tests for CLI parsing and derived settings.

use super::*;
use rstest::rstest;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["dbc-wheels", "--binary-version", "0.1"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[test]
fn cli_parses_defaults() {
    let cli = parse(&[]);
    assert_eq!(cli.binary_version, "0.1");
    assert!(cli.wheel_version.is_none());
    assert_eq!(cli.platform, PlatformSelector::All);
    assert!(cli.archive.is_none());
    assert!(cli.out_dir.is_none());
    assert!(cli.config.is_none());
    assert_eq!(cli.verbosity, 0);
    assert!(!cli.quiet);
}

#[test]
fn binary_version_is_required() {
    assert!(Cli::try_parse_from(["dbc-wheels"]).is_err());
}

#[test]
fn underscore_spellings_are_accepted() {
    let cli = Cli::parse_from([
        "dbc-wheels",
        "--binary_version",
        "0.1",
        "--wheel_version",
        "0.1.1",
    ]);
    assert_eq!(cli.wheel_version(), "0.1.1");
}

#[test]
fn platform_patterns_are_split() {
    let cli = parse(&["--platform", "linux,arm64"]);
    assert_eq!(
        cli.platform,
        PlatformSelector::Patterns(vec!["linux".to_owned(), "arm64".to_owned()])
    );
}

#[test]
fn archive_and_out_dir_are_paths() {
    let cli = parse(&["--archive", "dbc.tar.gz", "-o", "wheels"]);
    assert_eq!(cli.archive, Some(Utf8PathBuf::from("dbc.tar.gz")));
    assert_eq!(cli.out_dir, Some(Utf8PathBuf::from("wheels")));
}

#[rstest]
#[case::default(&[], LevelFilter::Info)]
#[case::verbose(&["-v"], LevelFilter::Debug)]
#[case::very_verbose(&["-vv"], LevelFilter::Trace)]
#[case::quiet(&["-q"], LevelFilter::Warn)]
fn log_level_follows_flags(#[case] args: &[&str], #[case] expected: LevelFilter) {
    assert_eq!(parse(args).log_level(), expected);
}

#[test]
fn verbose_and_quiet_conflict() {
    assert!(Cli::try_parse_from(["dbc-wheels", "--binary-version", "0.1", "-v", "-q"]).is_err());
}
