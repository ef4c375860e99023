//! BDD tests for turning release archives into wheels.

use camino::{Utf8Path, Utf8PathBuf};
use dbc_wheels::config::PackageConfig;
use dbc_wheels::platform::{PlatformKey, PlatformTable};
use dbc_wheels::test_utils::{FixtureFile, dbc_release_files, tar_gz_archive, zip_archive};
use dbc_wheels::wheel::{AssemblyContext, assemble_archive, write_package};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

struct WheelWorld {
    _temp_dir: tempfile::TempDir,
    root: Utf8PathBuf,
    config: PackageConfig,
    files: Vec<FixtureFile>,
    archive: Vec<u8>,
    platform: String,
    version: String,
    wheel: Option<PathBuf>,
    rebuilt: Option<PathBuf>,
    error: Option<String>,
}

#[fixture]
fn world() -> WheelWorld {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("UTF-8 path");
    std::fs::write(root.join("README.pypi.md"), "# dbc\n").expect("write description");
    let config = PackageConfig {
        description_path: root.join("README.pypi.md"),
        out_dir: root.join("dist"),
        ..PackageConfig::default()
    };
    WheelWorld {
        _temp_dir: temp_dir,
        root,
        config,
        files: Vec::new(),
        archive: Vec::new(),
        platform: String::new(),
        version: String::new(),
        wheel: None,
        rebuilt: None,
        error: None,
    }
}

fn encode(format: &str, files: &[FixtureFile]) -> Vec<u8> {
    match format {
        "tar.gz" => tar_gz_archive(files),
        "zip" => zip_archive(files),
        other => panic!("unknown archive format {other}"),
    }
}

fn build(world: &mut WheelWorld, out_dir: &Utf8Path) -> Option<PathBuf> {
    let key: PlatformKey = world.platform.parse().expect("valid platform key");
    let tag = PlatformTable::default().map(&key).expect("supported platform");
    let ctx = AssemblyContext {
        config: &world.config,
        version: &world.version,
    };
    let outcome = assemble_archive(ctx, &tag, &world.archive)
        .map_err(|e| e.to_string())
        .and_then(|descriptor| {
            write_package(out_dir.as_std_path(), &descriptor).map_err(|e| e.to_string())
        });
    match outcome {
        Ok(path) => Some(path),
        Err(message) => {
            world.error = Some(message);
            None
        }
    }
}

fn member(path: &Path, name: &str) -> (u32, Vec<u8>) {
    let bytes = std::fs::read(path).expect("read wheel");
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("valid wheel");
    let mut file = archive.by_name(name).expect("member present");
    let mut data = Vec::new();
    file.read_to_end(&mut data).expect("read member");
    (file.unix_mode().map_or(0, |m| m & 0o7777), data)
}

#[given("a \"{format}\" release archive with the dbc binary and its license")]
fn given_release_archive(world: &mut WheelWorld, format: String) {
    world.files = dbc_release_files();
    world.archive = encode(&format, &world.files);
}

#[given("a \"{format}\" release archive containing only a license")]
fn given_license_only(world: &mut WheelWorld, format: String) {
    world.files = vec![FixtureFile::new("LICENSE", 0o644, b"Apache-2.0 text")];
    world.archive = encode(&format, &world.files);
}

#[given("a \"{format}\" release archive containing only the binary")]
fn given_binary_only(world: &mut WheelWorld, format: String) {
    world.files = vec![FixtureFile::new("dbc_linux_amd64", 0o755, b"#!fakebin")];
    world.archive = encode(&format, &world.files);
}

#[given("a \"{format}\" release archive that also holds \"{path}\"")]
fn given_archive_with_extra(world: &mut WheelWorld, format: String, path: String) {
    world.files = dbc_release_files();
    world.files.push(FixtureFile::new(&path, 0o644, b"import os"));
    world.archive = encode(&format, &world.files);
}

#[given("a release archive that is not an archive")]
fn given_not_an_archive(world: &mut WheelWorld) {
    world.archive = b"\x7fELF\x02\x01\x01".to_vec();
}

#[when("the wheel is built for platform \"{platform}\" at version \"{version}\"")]
fn when_wheel_built(world: &mut WheelWorld, platform: String, version: String) {
    world.platform = platform;
    world.version = version;
    let out_dir = world.config.out_dir.clone();
    world.wheel = build(world, &out_dir);
}

#[when("the same files are packaged from a \"{format}\" archive")]
fn when_repackaged(world: &mut WheelWorld, format: String) {
    world.archive = encode(&format, &world.files);
    let out_dir = world.root.join("rebuilt");
    world.rebuilt = build(world, &out_dir);
}

#[then("the wheel is named \"{name}\"")]
fn then_wheel_named(world: &mut WheelWorld, name: String) {
    let wheel = world.wheel.as_ref().expect("wheel built");
    assert_eq!(wheel.file_name().and_then(|n| n.to_str()), Some(name.as_str()));
}

#[then("the wheel contains \"{path}\" with mode {mode}")]
fn then_member_mode(world: &mut WheelWorld, path: String, mode: String) {
    let wheel = world.wheel.as_ref().expect("wheel built");
    let expected = u32::from_str_radix(&mode, 8).expect("octal mode");
    assert_eq!(member(wheel, &path).0, expected);
}

#[then("the launcher runs \"{binary}\"")]
fn then_launcher_runs(world: &mut WheelWorld, binary: String) {
    let wheel = world.wheel.as_ref().expect("wheel built");
    let (_, launcher) = member(wheel, "dbc/__main__.py");
    let launcher = String::from_utf8(launcher).expect("ASCII launcher");
    assert!(
        launcher.contains(&format!("\"{binary}\"")),
        "launcher does not reference {binary}:\n{launcher}"
    );
}

#[then("the wheel contains \"{path}\" reading \"{content}\"")]
fn then_member_content(world: &mut WheelWorld, path: String, content: String) {
    let wheel = world.wheel.as_ref().expect("wheel built");
    assert_eq!(member(wheel, &path).1, content.as_bytes());
}

#[then("both wheels are byte-identical")]
fn then_identical(world: &mut WheelWorld) {
    let first = world.wheel.as_ref().expect("first wheel");
    let second = world.rebuilt.as_ref().expect("second wheel");
    assert_eq!(first.file_name(), second.file_name());
    assert_eq!(
        std::fs::read(first).expect("read first"),
        std::fs::read(second).expect("read second")
    );
}

#[then("packaging fails mentioning \"{keyword}\"")]
fn then_fails(world: &mut WheelWorld, keyword: String) {
    let error = world.error.as_deref().expect("packaging failed");
    assert!(error.contains(&keyword), "unexpected error: {error}");
}

#[then("no wheel is written")]
fn then_no_wheel(world: &mut WheelWorld) {
    assert!(world.wheel.is_none());
    let written = std::fs::read_dir(&world.config.out_dir)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(written, 0);
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "A tar.gz archive becomes a platform wheel"
)]
fn scenario_tar_gz_wheel(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "Zip and tar.gz archives produce identical wheels"
)]
fn scenario_format_transparency(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "Rebuilding a wheel is reproducible"
)]
fn scenario_reproducible(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "An archive without the binary is rejected"
)]
fn scenario_missing_binary(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "An archive without its license is rejected"
)]
fn scenario_missing_license(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "An unrecognised archive is rejected"
)]
fn scenario_unrecognised_archive(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "A tar.gz entry climbing out of the package is rejected"
)]
fn scenario_parent_entry(world: WheelWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/wheel_packaging.feature",
    name = "An absolute zip entry is rejected"
)]
fn scenario_absolute_entry(world: WheelWorld) {
    let _ = world;
}
