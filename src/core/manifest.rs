//! Aotpack.toml manifest parsing and schema.
//!
//! The manifest describes what to compile, how to package it and where the
//! execution profiles live. Paths are relative to the manifest's directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::app::{ApplicationKind, PackagingKind, PostInstallAction, StackTraceSupport};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Aotpack.toml";

/// The parsed Aotpack.toml manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Manifest {
    pub package: PackageMetadata,

    pub app: ApplicationKind,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub packaging: PackagingSettings,

    #[serde(default)]
    pub installer: InstallerSettings,

    #[serde(default)]
    pub runtime: RuntimeSettings,

    #[serde(default)]
    pub profiles: ProfileSettings,

    #[serde(default)]
    pub macos_bundle: Option<MacosBundleSettings>,
}

/// `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageMetadata {
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub vendor: Option<String>,

    /// Product name shown by installers (defaults to the package name)
    #[serde(default)]
    pub product: Option<String>,

    /// Base name of the final artifact (defaults to the package name)
    #[serde(default)]
    pub artifact_name: Option<String>,

    /// Base name of the native executable (defaults to the package name)
    #[serde(default)]
    pub output_name: Option<String>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSettings {
    /// Root directory for every build output
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub stack_trace_support: StackTraceSupport,

    /// Extra lines appended to the compiler project file
    #[serde(default)]
    pub compiler_options: Vec<String>,

    /// Artifact whose age the execution profiles are compared against
    #[serde(default)]
    pub main_artifact: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("target/aot")
}

impl Default for BuildSettings {
    fn default() -> Self {
        BuildSettings {
            output_dir: default_output_dir(),
            stack_trace_support: StackTraceSupport::default(),
            compiler_options: Vec::new(),
            main_artifact: None,
        }
    }
}

/// `[packaging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackagingSettings {
    #[serde(default)]
    pub kind: PackagingKind,

    /// Directory whose contents are added to every package
    #[serde(default)]
    pub package_files: Option<PathBuf>,
}

/// `[installer]` section, used by native installer packaging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InstallerSettings {
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub install_dir: Option<String>,

    #[serde(default)]
    pub cleanup_after_uninstall: bool,

    #[serde(default)]
    pub eula: Option<PathBuf>,

    #[serde(default)]
    pub post_install: Vec<PostInstallAction>,
}

/// `[runtime]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeSettings {
    /// Disk footprint reduction mode (e.g. `medium`, `high-memory`, `high-disk`)
    #[serde(default)]
    pub disk_footprint_reduction: Option<String>,

    #[serde(default)]
    pub slim_down: Option<SlimDownSettings>,
}

impl RuntimeSettings {
    /// Whether any runtime-reduction feature is enabled.
    pub fn has_runtime_reduction(&self) -> bool {
        self.slim_down.is_some() || self.disk_footprint_reduction.is_some()
    }
}

/// `[runtime.slim-down]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlimDownSettings {
    /// File name of the detached package, created in the output directory
    pub detached_package: String,

    /// URL the application downloads the detached package from
    pub detached_base_url: String,

    /// Runtime components moved into the detached package
    #[serde(default)]
    pub components: Vec<String>,
}

/// `[profiles]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProfileSettings {
    /// Directory the profiles are stored in
    #[serde(default = "default_profiles_dir")]
    pub output_dir: PathBuf,

    /// Base name of the profile files (defaults to the output name)
    #[serde(default)]
    pub output_name: Option<String>,

    /// Warn when a profile is at least this many days older than the
    /// main artifact. Zero or negative disables the check.
    #[serde(default = "default_days_to_warn")]
    pub days_to_warn_about_outdated_profiles: i64,

    /// Run the instrumented image on this machine
    #[serde(default = "default_true")]
    pub profile_locally: bool,

    /// Where the instrumented image is built (defaults to `<output>/app-to-profile`)
    #[serde(default)]
    pub profiling_image_dir: Option<PathBuf>,

    /// Arguments for the profiling run
    #[serde(default)]
    pub run_args: Vec<String>,
}

fn default_profiles_dir() -> PathBuf {
    PathBuf::from("src/main/aotresources")
}

fn default_days_to_warn() -> i64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for ProfileSettings {
    fn default() -> Self {
        ProfileSettings {
            output_dir: default_profiles_dir(),
            output_name: None,
            days_to_warn_about_outdated_profiles: default_days_to_warn(),
            profile_locally: true,
            profiling_image_dir: None,
            run_args: Vec::new(),
        }
    }
}

/// `[macos-bundle]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MacosBundleSettings {
    /// Bundle directory name without `.app` (defaults to the package name)
    #[serde(default)]
    pub file_name: Option<String>,

    /// `CFBundleName` (defaults to the package name)
    #[serde(default)]
    pub bundle_name: Option<String>,

    pub identifier: String,

    /// `CFBundleVersionString` (defaults to the package version)
    #[serde(default)]
    pub version: Option<String>,

    /// `CFBundleShortVersionString` (defaults to the version)
    #[serde(default)]
    pub short_version: Option<String>,

    #[serde(default)]
    pub icon: Option<PathBuf>,

    #[serde(default = "default_true")]
    pub high_resolution_capable: bool,

    /// Code signing identity for the bundle
    #[serde(default)]
    pub developer_id: Option<String>,

    /// Signing identity for the installer package
    #[serde(default)]
    pub publisher_id: Option<String>,

    #[serde(default = "default_install_path")]
    pub install_path: String,
}

fn default_install_path() -> String {
    "/Applications".to_string()
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse manifest text.
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_manifest_defaults() {
        let manifest = Manifest::parse(
            r#"
[package]
name = "hello"

[app]
kind = "plain"
main-class = "com.example.Hello"
classpath = ["target/hello.jar"]
"#,
        )
        .unwrap();

        assert_eq!(manifest.package.name, "hello");
        assert_eq!(manifest.package.version, "1.0.0");
        assert_eq!(manifest.packaging.kind, PackagingKind::Zip);
        assert_eq!(manifest.build.output_dir, PathBuf::from("target/aot"));
        assert_eq!(manifest.profiles.days_to_warn_about_outdated_profiles, 30);
        assert!(manifest.profiles.profile_locally);
        assert!(!manifest.runtime.has_runtime_reduction());
        assert!(manifest.macos_bundle.is_none());
    }

    #[test]
    fn test_full_manifest() {
        let manifest = Manifest::parse(
            r#"
[package]
name = "shop"
version = "2.1.0"
vendor = "Acme"
artifact-name = "shop-2.1"

[app]
kind = "servlet-container"
home = "tomcat"
war = "target/shop.war"

[packaging]
kind = "macos-app-bundle"

[runtime]
disk-footprint-reduction = "high-disk"

[runtime.slim-down]
detached-package = "shop.pkl"
detached-base-url = "https://example.com/shop/"

[profiles]
days-to-warn-about-outdated-profiles = 0
profile-locally = false

[macos-bundle]
identifier = "com.acme.shop"
developer-id = "Developer ID Application: Acme"

[[installer.post-install]]
type = "run"
target = "shop.exe"
"#,
        )
        .unwrap();

        assert_eq!(manifest.packaging.kind, PackagingKind::MacosAppBundle);
        assert!(manifest.runtime.has_runtime_reduction());
        assert_eq!(
            manifest.runtime.slim_down.as_ref().unwrap().detached_package,
            "shop.pkl"
        );
        assert!(!manifest.profiles.profile_locally);
        let bundle = manifest.macos_bundle.unwrap();
        assert_eq!(bundle.install_path, "/Applications");
        assert!(bundle.publisher_id.is_none());
        assert_eq!(manifest.installer.post_install.len(), 1);
    }

    #[test]
    fn test_missing_app_section_fails() {
        let result = Manifest::parse("[package]\nname = \"x\"\n");
        assert!(result.is_err());
    }
}
