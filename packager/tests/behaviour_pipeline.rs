//! BDD tests for the release pipeline driven by stub collaborators.

use camino::Utf8PathBuf;
use dbc_wheels::config::PackageConfig;
use dbc_wheels::download::{AssetFetcher, DownloadError};
use dbc_wheels::pipeline::{BuildReport, Pipeline, ReleaseRequest};
use dbc_wheels::platform::PlatformSelector;
use dbc_wheels::release::{Release, ReleaseResolver, ResolveError, parse_release};
use dbc_wheels::test_utils::{FixtureFile, release_json, tar_gz_archive, zip_archive};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::Cell;
use std::collections::BTreeMap;

/// Serves one canned release and counts lookups.
struct StubResolver {
    release: Release,
    calls: Cell<usize>,
}

impl ReleaseResolver for StubResolver {
    fn resolve(&self, _org: &str, _repo: &str, tag: &str) -> Result<Release, ResolveError> {
        self.calls.set(self.calls.get() + 1);
        if tag == self.release.tag_name {
            return Ok(self.release.clone());
        }
        Err(ResolveError::NotFound {
            tag: tag.to_owned(),
            url: "https://api.example.test".to_owned(),
        })
    }
}

/// Serves asset bodies by file name.
struct StubFetcher {
    bodies: BTreeMap<String, Vec<u8>>,
}

impl AssetFetcher for StubFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.bodies
            .iter()
            .find(|(name, _)| url.ends_with(name.as_str()))
            .map(|(_, body)| body.clone())
            .ok_or_else(|| DownloadError::NotFound {
                url: url.to_owned(),
            })
    }
}

struct PipelineWorld {
    _temp_dir: tempfile::TempDir,
    config: PackageConfig,
    tag: String,
    archives: BTreeMap<String, Vec<u8>>,
    served: BTreeMap<String, Vec<u8>>,
    resolver_calls: Option<usize>,
    progress: String,
    outcome: Option<Result<(), String>>,
}

#[fixture]
fn world() -> PipelineWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    std::fs::write(root.join("README.pypi.md"), "# dbc\n").expect("write description");
    let config = PackageConfig {
        description_path: root.join("README.pypi.md"),
        out_dir: root.join("dist"),
        ..PackageConfig::default()
    };
    PipelineWorld {
        _temp_dir: temp_dir,
        config,
        tag: String::new(),
        archives: BTreeMap::new(),
        served: BTreeMap::new(),
        resolver_calls: None,
        progress: String::new(),
        outcome: None,
    }
}

fn platform_files(platform: &str) -> Vec<FixtureFile> {
    let binary = format!("dbc_{}", platform.replace('-', "_"));
    vec![
        FixtureFile::new(&binary, 0o755, b"#!fakebin"),
        FixtureFile::new("LICENSE", 0o644, b"Apache-2.0 text"),
    ]
}

fn asset_name(platform: &str, version: &str) -> String {
    if platform.starts_with("linux") {
        format!("dbc-{platform}-{version}.tar.gz")
    } else {
        format!("dbc-{platform}-{version}.zip")
    }
}

fn publish(world: &mut PipelineWorld, tag: &str, platforms: &str, version: &str) {
    world.tag = tag.to_owned();
    for platform in platforms.split(',') {
        let name = asset_name(platform, version);
        let files = platform_files(platform);
        let bytes = if name.ends_with(".zip") {
            zip_archive(&files)
        } else {
            tar_gz_archive(&files)
        };
        world.archives.insert(name, bytes);
    }
    world.served = world.archives.clone();
}

#[given("release \"{tag}\" publishes archives for \"{platforms}\"")]
fn given_release(world: &mut PipelineWorld, tag: String, platforms: String) {
    publish(world, &tag, &platforms, &tag);
}

#[given("release \"{tag}\" mislabels its \"{platform}\" archive as version \"{version}\"")]
fn given_mislabelled_release(world: &mut PipelineWorld, tag: String, platform: String, version: String) {
    publish(world, &tag, &platform, &version);
}

#[given("the download of \"{asset}\" is tampered with")]
fn given_tampered(world: &mut PipelineWorld, asset: String) {
    let body = world.served.get_mut(&asset).expect("published asset");
    if let Some(byte) = body.last_mut() {
        *byte ^= 0xFF;
    }
}

#[given("the \"{platform}\" archive lacks its license")]
fn given_missing_license(world: &mut PipelineWorld, platform: String) {
    let name = asset_name(&platform, &world.tag);
    let binary = format!("dbc_{}", platform.replace('-', "_"));
    let files = vec![FixtureFile::new(&binary, 0o755, b"MZ")];
    let bytes = if name.ends_with(".zip") {
        zip_archive(&files)
    } else {
        tar_gz_archive(&files)
    };
    world.archives.insert(name.clone(), bytes.clone());
    world.served.insert(name, bytes);
}

#[when("wheels are built for release \"{tag}\" and platforms \"{platforms}\"")]
fn when_built(world: &mut PipelineWorld, tag: String, platforms: String) {
    let assets: Vec<(&str, &[u8])> = world
        .archives
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
        .collect();
    let release = parse_release(&release_json(&world.tag, &assets)).expect("valid release");
    let resolver = StubResolver {
        release,
        calls: Cell::new(0),
    };
    let fetcher = StubFetcher {
        bodies: world.served.clone(),
    };
    let platforms: PlatformSelector = platforms.parse().expect("infallible");
    let request = ReleaseRequest {
        binary_version: &tag,
        wheel_version: &tag,
        platforms: &platforms,
    };

    let mut progress = Vec::new();
    let outcome = Pipeline::new(&world.config, &resolver, &fetcher)
        .build_release(&request, &mut progress)
        .and_then(BuildReport::into_result);
    world.progress = String::from_utf8_lossy(&progress).into_owned();
    world.resolver_calls = Some(resolver.calls.get());
    world.outcome = Some(outcome.map(|_| ()).map_err(|e| e.to_string()));
}

#[then("the run succeeds")]
fn then_succeeds(world: &mut PipelineWorld) {
    let outcome = world.outcome.as_ref().expect("run attempted");
    assert!(outcome.is_ok(), "run failed: {outcome:?}");
}

#[then("the run fails mentioning \"{keyword}\"")]
fn then_fails(world: &mut PipelineWorld, keyword: String) {
    let outcome = world.outcome.as_ref().expect("run attempted");
    let message = outcome.as_ref().expect_err("run should fail");
    assert!(
        message.contains(&keyword) || world.progress.contains(&keyword),
        "neither error \"{message}\" nor progress mention {keyword}:\n{}",
        world.progress
    );
}

#[then("{count} wheel is written")]
fn then_one_written(world: &mut PipelineWorld, count: usize) {
    assert_eq!(written_wheels(world), count);
}

#[then("{count} wheels are written")]
fn then_many_written(world: &mut PipelineWorld, count: usize) {
    assert_eq!(written_wheels(world), count);
}

fn written_wheels(world: &PipelineWorld) -> usize {
    std::fs::read_dir(&world.config.out_dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().ends_with(".whl"))
                .count()
        })
        .unwrap_or(0)
}

#[then("the progress output mentions \"{text}\"")]
fn then_progress_mentions(world: &mut PipelineWorld, text: String) {
    assert!(
        world.progress.contains(&text),
        "progress lacks {text}:\n{}",
        world.progress
    );
}

#[then("no release lookup was made")]
fn then_no_lookup(world: &mut PipelineWorld) {
    assert_eq!(world.resolver_calls, Some(0));
}

#[scenario(
    path = "tests/features/release_pipeline.feature",
    name = "Selected platforms are built from a verified release"
)]
fn scenario_selected_platforms(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/release_pipeline.feature",
    name = "Tampered downloads are rejected"
)]
fn scenario_tampered_download(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/release_pipeline.feature",
    name = "Unsupported platforms fail before any request"
)]
fn scenario_unsupported_platform(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/release_pipeline.feature",
    name = "Assets for another version are rejected"
)]
fn scenario_version_mismatch(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/release_pipeline.feature",
    name = "A broken platform does not affect the others"
)]
fn scenario_partial_failure(world: PipelineWorld) {
    let _ = world;
}
