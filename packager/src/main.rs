//! `dbc-wheels` entrypoint.
//!
//! Builds platform-tagged wheels for a dbc release, either from the hosted
//! release or from a local archive.

use clap::Parser;
use dbc_wheels::cli::Cli;
use dbc_wheels::config::PackageConfig;
use dbc_wheels::download::HttpFetcher;
use dbc_wheels::error::Result;
use dbc_wheels::output::write_stderr_line;
use dbc_wheels::pipeline::{BuildReport, Pipeline, ReleaseRequest};
use dbc_wheels::release::GitHubResolver;
use std::io::{self, Write};

/// Environment variable holding an optional API token.
const TOKEN_ENV: &str = "GITHUB_TOKEN";

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();
    let mut stderr = io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = load_config(cli)?;
    let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
    let resolver = GitHubResolver::new(config.api_base.as_str(), token);
    let fetcher = HttpFetcher;
    let pipeline = Pipeline::new(&config, &resolver, &fetcher);

    let mut sink = io::sink();
    let progress: &mut dyn Write = if cli.quiet { &mut sink } else { stderr };

    if let Some(archive) = &cli.archive {
        pipeline.build_local(archive, &cli.platform, cli.wheel_version(), progress)?;
        return Ok(());
    }

    let request = ReleaseRequest {
        binary_version: &cli.binary_version,
        wheel_version: cli.wheel_version(),
        platforms: &cli.platform,
    };
    pipeline
        .build_release(&request, progress)
        .and_then(BuildReport::into_result)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<PackageConfig> {
    let mut config = match &cli.config {
        Some(path) => PackageConfig::load(path)?,
        None => PackageConfig::default(),
    };
    if let Some(out_dir) = &cli.out_dir {
        config.out_dir.clone_from(out_dir);
    }
    Ok(config)
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
