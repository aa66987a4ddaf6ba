//! Test fixtures: projects on disk, toolchains and simulated tools.

use std::path::{Path, PathBuf};

use semver::Version;

use crate::builder::invoker::CommandSpec;
use crate::builder::toolchain::Toolchain;
use crate::core::app::TargetOs;
use crate::core::manifest::Manifest;
use crate::core::project::Project;
use crate::test_support::{CommandPattern, InvokerExpectation};
use crate::util::fs::{compress_to_zip, copy_dir_all};

/// A minimal plain application manifest.
pub const PLAIN_MANIFEST: &str = r#"
[package]
name = "hello"

[app]
kind = "plain"
main-class = "com.example.Hello"
classpath = ["target/*.jar"]
"#;

/// A Windows service manifest.
pub const SERVICE_MANIFEST: &str = r#"
[package]
name = "svc"

[app]
kind = "windows-service"
main-class = "com.example.Svc"
classpath = ["target/*.jar"]
name = "ExampleSvc"
arguments = ["-port", "8080"]
"#;

/// Write `target/<name>.jar` so classpath patterns resolve.
pub fn write_jar(root: &Path, name: &str) -> PathBuf {
    let path = root.join("target").join(format!("{}.jar", name));
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "PK jar").unwrap();
    path
}

/// A project rooted at `root` from `manifest` plus `extra` TOML, with a jar
/// in place for the classpath.
pub fn project_with(root: &Path, manifest: &str, extra: &str) -> Project {
    write_jar(root, "app");
    let manifest = Manifest::parse(&format!("{}\n{}", manifest, extra)).unwrap();
    Project::new(root, manifest)
}

/// A plain application project with additional manifest sections.
pub fn plain_project(root: &Path, extra: &str) -> Project {
    project_with(root, PLAIN_MANIFEST, extra)
}

/// A toolchain of the given version targeting `os`.
pub fn toolchain(major: u64, minor: u64, os: TargetOs) -> Toolchain {
    Toolchain::new("/opt/jet", Version::new(major, minor, 0), os)
}

/// Packager options of `cmd` as whitespace-separated tokens, read from the
/// response file when one is used.
pub fn packager_tokens(cmd: &CommandSpec) -> Vec<String> {
    let Some(pos) = cmd.args.iter().position(|a| a == "-arg-file") else {
        return cmd.args.clone();
    };
    let mut tokens: Vec<String> = cmd
        .args
        .get(pos + 1)
        .and_then(|path| std::fs::read_to_string(path).ok())
        .unwrap_or_default()
        .split_whitespace()
        .map(|t| t.trim_matches('"').to_string())
        .collect();
    tokens.extend(cmd.args.iter().skip(pos + 2).cloned());
    tokens
}

/// The parameter following option `name`.
pub fn option_value(tokens: &[String], name: &str) -> Option<String> {
    let pos = tokens.iter().position(|t| t == name)?;
    tokens.get(pos + 1).cloned()
}

/// An `xpack` stand-in that creates its `-target`: a file for installers, a
/// directory holding the first `-add-file` otherwise (copied when it is a
/// directory in the build dir), plus `<target>.zip` when asked to zip.
pub fn fake_packager() -> InvokerExpectation {
    InvokerExpectation::new(CommandPattern::StartsWith("xpack".into()), 0).with_side_effect(
        |cmd, cwd| {
            let tokens = packager_tokens(cmd);
            let Some(target) = option_value(&tokens, "-target") else {
                return;
            };
            let target = PathBuf::from(target);

            if tokens.iter().any(|t| t == "excelsior-installer") {
                std::fs::create_dir_all(target.parent().unwrap()).unwrap();
                std::fs::write(&target, "installer").unwrap();
                return;
            }

            std::fs::create_dir_all(&target).unwrap();
            let file = option_value(&tokens, "-add-file").unwrap_or_else(|| "image".to_string());
            let source = cwd.join(&file);
            if source.is_dir() {
                copy_dir_all(&source, &target.join(&file)).unwrap();
            } else {
                std::fs::write(target.join(file), "native image").unwrap();
            }

            if tokens.iter().any(|t| t == "-zip") {
                let zip = PathBuf::from(format!("{}.zip", target.display()));
                compress_to_zip(&target, &zip).unwrap();
            }
        },
    )
}

/// A `jc` stand-in that writes the native image to `image`, relative to the
/// build directory.
pub fn fake_compiler(image: impl Into<PathBuf>) -> InvokerExpectation {
    let image = image.into();
    InvokerExpectation::new(CommandPattern::StartsWith("jc ".into()), 0).with_side_effect(
        move |_cmd, cwd| {
            let path = cwd.join(&image);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, "native image").unwrap();
        },
    )
}

/// An instrumented-image stand-in that writes the JIT profile to `jit`.
///
/// Like a real spawn, nothing happens unless the program exists on disk.
pub fn fake_profiling_run(program: &str, jit: PathBuf) -> InvokerExpectation {
    InvokerExpectation::new(CommandPattern::StartsWith(program.to_string()), 0).with_side_effect(
        move |cmd, _cwd| {
            if !cmd.program.is_file() {
                return;
            }
            std::fs::create_dir_all(jit.parent().unwrap()).unwrap();
            std::fs::write(&jit, "profile").unwrap();
        },
    )
}
