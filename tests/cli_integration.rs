//! CLI integration tests for Aotpack.
//!
//! These tests run the `aotpack` binary against projects in temporary
//! directories. The end-to-end build tests use shell-script stand-ins for the
//! AOT compiler and packager, so they only run on Unix.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const MANIFEST: &str = r#"
[package]
name = "hello"

[app]
kind = "plain"
main-class = "com.example.Hello"
classpath = ["target/*.jar"]
"#;

/// Get the aotpack binary command, isolated from the user's configuration.
fn aotpack(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("aotpack").unwrap();
    cmd.env("HOME", home).env_remove("JET_HOME");
    cmd
}

/// Create a temporary directory for test projects.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Write a project with one jar on its classpath.
fn write_project(root: &Path, manifest: &str) {
    fs::create_dir_all(root.join("target")).unwrap();
    fs::write(root.join("Aotpack.toml"), manifest).unwrap();
    fs::write(root.join("target/app.jar"), "PK jar").unwrap();
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// A fake toolchain: `jc` reports version 11.0 and writes `hello` into the
/// build directory; `xpack` copies it into its `-target`.
#[cfg(unix)]
fn write_toolchain(home: &Path, compile_exit: i32) {
    write_script(
        &home.join("bin/jc"),
        &format!(
            r#"if [ "$1" = "-version" ]; then
  echo "AOT compiler version 11.0"
  exit 0
fi
echo "compiling $2"
printf 'native' > hello
exit {}
"#,
            compile_exit
        ),
    );
    write_script(
        &home.join("bin/xpack"),
        r#"target=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-target" ]; then target="$arg"; fi
  prev="$arg"
done
mkdir -p "$target"
cp hello "$target/hello"
"#,
    );
}

// ============================================================================
// aotpack --help / completions
// ============================================================================

#[test]
fn test_help_lists_commands() {
    let tmp = temp_dir();

    aotpack(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("profile"))
        .stdout(predicate::str::contains("toolchain"));
}

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    aotpack(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("aotpack"));
}

// ============================================================================
// aotpack build
// ============================================================================

#[test]
fn test_build_without_manifest_fails() {
    let tmp = temp_dir();

    aotpack(tmp.path())
        .arg("build")
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `Aotpack.toml`"));
}

#[test]
fn test_build_with_missing_toolchain_fails() {
    let tmp = temp_dir();
    write_project(tmp.path(), MANIFEST);

    aotpack(tmp.path())
        .args(["build", "--jet-home"])
        .arg(tmp.path().join("no-such-jet"))
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("AOT compiler not found"));
}

#[cfg(unix)]
#[test]
fn test_build_plain_zip() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    let project = tmp.path().join("hello");
    write_toolchain(&jet, 0);
    write_project(&project, MANIFEST);

    aotpack(tmp.path())
        .args(["build", "--jet-home"])
        .arg(&jet)
        .current_dir(&project)
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished zip"));

    assert!(project.join("target/aot/hello.zip").is_file());
    assert!(project.join("target/aot/app/hello").is_file());
    let prj = fs::read_to_string(project.join("target/aot/build/hello.prj")).unwrap();
    assert!(prj.contains("-main=com.example.Hello"));
    assert!(project.join("target/aot/build/lib/app.jar").is_file());
}

#[cfg(unix)]
#[test]
fn test_build_json_events() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    let project = tmp.path().join("hello");
    write_toolchain(&jet, 0);
    write_project(&project, MANIFEST);

    aotpack(tmp.path())
        .args(["build", "--message-format", "json"])
        .env("JET_HOME", &jet)
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"reason\":\"build-started\""))
        .stdout(predicate::str::contains("\"toolchain_version\":\"11.0.0\""))
        .stdout(predicate::str::contains("\"reason\":\"build-artifact\""))
        .stdout(predicate::str::contains("\"success\":true"));
}

#[cfg(unix)]
#[test]
fn test_build_compile_failure() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    let project = tmp.path().join("hello");
    write_toolchain(&jet, 1);
    write_project(&project, MANIFEST);

    aotpack(tmp.path())
        .args(["build", "--jet-home"])
        .arg(&jet)
        .current_dir(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Native compilation failed"));

    assert!(!project.join("target/aot/app/hello").exists());
    assert!(!project.join("target/aot/hello.zip").exists());
}

#[cfg(unix)]
#[test]
fn test_profile_requires_pgo_capable_toolchain() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    let project = tmp.path().join("hello");
    write_toolchain(&jet, 0);
    write_project(&project, MANIFEST);

    aotpack(tmp.path())
        .args(["profile", "--jet-home"])
        .arg(&jet)
        .current_dir(&project)
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile-guided optimization"));
}

// ============================================================================
// aotpack toolchain
// ============================================================================

#[cfg(unix)]
#[test]
fn test_toolchain_reports_capabilities() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    write_toolchain(&jet, 0);

    aotpack(tmp.path())
        .args(["toolchain", "--jet-home"])
        .arg(&jet)
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("11.0.0"))
        .stdout(predicate::str::contains("native zip:                  no"));
}

#[cfg(unix)]
#[test]
fn test_toolchain_version_from_project_config() {
    let tmp = temp_dir();
    let jet = tmp.path().join("jet");
    let project = tmp.path().join("hello");
    write_toolchain(&jet, 0);
    write_project(&project, MANIFEST);
    fs::create_dir_all(project.join(".aotpack")).unwrap();
    fs::write(
        project.join(".aotpack/config.toml"),
        "[toolchain]\nversion = \"12.1\"\n",
    )
    .unwrap();

    aotpack(tmp.path())
        .args(["toolchain", "--jet-home"])
        .arg(&jet)
        .current_dir(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("12.1.0"))
        .stdout(predicate::str::contains("native zip:                  yes"));
}

// ============================================================================
// aotpack clean
// ============================================================================

#[test]
fn test_clean_removes_output_directory() {
    let tmp = temp_dir();
    write_project(tmp.path(), MANIFEST);
    fs::create_dir_all(tmp.path().join("target/aot/app")).unwrap();
    fs::write(tmp.path().join("target/aot/app/hello"), "image").unwrap();

    aotpack(tmp.path())
        .arg("clean")
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));

    assert!(!tmp.path().join("target/aot").exists());
    assert!(tmp.path().join("target/app.jar").exists());
}
