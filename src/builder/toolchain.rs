//! AOT toolchain location, version and capabilities.
//!
//! Toolchain detection priority:
//! 1. `--jet-home` / `JET_HOME`
//! 2. Config file (`.aotpack/config.toml` or `~/.aotpack/config.toml`)
//! 3. The directory containing `jc` on PATH
//!
//! Every version-dependent decision goes through [`ToolchainCapabilities`];
//! the version boundaries themselves are configuration.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use semver::Version;

use crate::core::app::TargetOs;
use crate::util::config::{CapabilitySettings, ToolchainSettings};
use crate::util::process::{find_executable, ProcessBuilder};

/// Name of the AOT compiler executable.
pub const COMPILER: &str = "jc";

/// Name of the packager executable.
pub const PACKAGER: &str = "xpack";

/// Name of the Windows service control helper shipped with the toolchain.
pub const SERVICE_HELPER: &str = "isrv.exe";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("valid version regex"));

/// Capability queries against the toolchain in use.
pub trait ToolchainCapabilities {
    /// The toolchain version.
    fn version(&self) -> &Version;

    /// The packager can compress the self-contained directory itself.
    fn supports_native_zip(&self) -> bool;

    /// Native zipping also works when slim-down or disk footprint reduction
    /// is enabled.
    fn native_zip_with_runtime_reduction(&self) -> bool;

    /// The packager accepts `-arg-file <path>`.
    fn supports_response_files(&self) -> bool;

    /// Profile-guided optimization is available.
    fn supports_pgo(&self) -> bool;
}

/// Minimum toolchain versions for each capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityThresholds {
    pub native_zip: Version,
    pub native_zip_with_runtime_reduction: Version,
    pub response_files: Version,
    pub pgo: Version,
}

impl Default for CapabilityThresholds {
    fn default() -> Self {
        CapabilityThresholds {
            native_zip: Version::new(11, 3, 0),
            native_zip_with_runtime_reduction: Version::new(12, 0, 0),
            response_files: Version::new(11, 3, 0),
            pgo: Version::new(12, 0, 0),
        }
    }
}

impl CapabilityThresholds {
    /// Defaults overridden by any configured thresholds.
    pub fn from_settings(settings: &CapabilitySettings) -> Result<Self> {
        let mut thresholds = CapabilityThresholds::default();
        let pick = |value: &Option<String>, name: &str, slot: &mut Version| -> Result<()> {
            if let Some(value) = value {
                *slot = parse_version(value).with_context(|| {
                    format!("invalid version `{}` for capability `{}`", value, name)
                })?;
            }
            Ok(())
        };
        pick(&settings.native_zip_since, "native-zip-since", &mut thresholds.native_zip)?;
        pick(
            &settings.runtime_reduction_zip_since,
            "runtime-reduction-zip-since",
            &mut thresholds.native_zip_with_runtime_reduction,
        )?;
        pick(
            &settings.response_files_since,
            "response-files-since",
            &mut thresholds.response_files,
        )?;
        pick(&settings.pgo_since, "pgo-since", &mut thresholds.pgo)?;
        Ok(thresholds)
    }
}

/// Parse the first `major.minor[.patch]` found in `text`.
pub fn parse_version(text: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// An installed AOT toolchain.
#[derive(Debug, Clone)]
pub struct Toolchain {
    home: PathBuf,
    version: Version,
    target_os: TargetOs,
    thresholds: CapabilityThresholds,
}

impl Toolchain {
    pub fn new(home: impl Into<PathBuf>, version: Version, target_os: TargetOs) -> Self {
        Toolchain {
            home: home.into(),
            version,
            target_os,
            thresholds: CapabilityThresholds::default(),
        }
    }

    /// Replace the capability thresholds.
    pub fn with_thresholds(mut self, thresholds: CapabilityThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Locate the toolchain and determine its version.
    pub fn detect(
        home_override: Option<&Path>,
        settings: &ToolchainSettings,
        capabilities: &CapabilitySettings,
    ) -> Result<Self> {
        let home = match home_override.or(settings.home.as_deref()) {
            Some(home) => home.to_path_buf(),
            None => home_from_path()?,
        };

        let compiler = compiler_path(&home);
        if !compiler.is_file() {
            bail!(
                "AOT compiler not found at {}\n\
                 hint: point --jet-home or JET_HOME at the toolchain installation",
                compiler.display()
            );
        }

        let version = match settings.version.as_deref() {
            Some(v) => parse_version(v)
                .with_context(|| format!("invalid toolchain version in config: `{}`", v))?,
            None => query_version(&compiler)?,
        };

        let target_os = match settings.target_os.as_deref() {
            Some(os) => os.parse::<TargetOs>().map_err(|e| anyhow::anyhow!(e))?,
            None => TargetOs::host(),
        };

        let thresholds = CapabilityThresholds::from_settings(capabilities)?;

        tracing::debug!(
            "Using toolchain {} v{} targeting {}",
            home.display(),
            version,
            target_os
        );

        Ok(Toolchain::new(home, version, target_os).with_thresholds(thresholds))
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn target_os(&self) -> TargetOs {
        self.target_os
    }

    pub fn thresholds(&self) -> &CapabilityThresholds {
        &self.thresholds
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// Path of the AOT compiler.
    pub fn compiler(&self) -> PathBuf {
        compiler_path(&self.home)
    }

    /// Path of the packager.
    pub fn packager(&self) -> PathBuf {
        self.bin_dir().join(TargetOs::host().exe_name(PACKAGER))
    }

    /// Path of the Windows service control helper.
    pub fn service_helper(&self) -> PathBuf {
        self.bin_dir().join(SERVICE_HELPER)
    }
}

impl ToolchainCapabilities for Toolchain {
    fn version(&self) -> &Version {
        &self.version
    }

    fn supports_native_zip(&self) -> bool {
        self.version >= self.thresholds.native_zip
    }

    fn native_zip_with_runtime_reduction(&self) -> bool {
        self.version >= self.thresholds.native_zip_with_runtime_reduction
    }

    fn supports_response_files(&self) -> bool {
        self.version >= self.thresholds.response_files
    }

    fn supports_pgo(&self) -> bool {
        self.version >= self.thresholds.pgo
    }
}

fn compiler_path(home: &Path) -> PathBuf {
    home.join("bin").join(TargetOs::host().exe_name(COMPILER))
}

fn home_from_path() -> Result<PathBuf> {
    let Some(compiler) = find_executable(COMPILER) else {
        bail!(
            "no AOT toolchain found\n\
             hint: set JET_HOME, pass --jet-home, or add the toolchain's bin directory to PATH"
        );
    };
    // <home>/bin/jc
    compiler
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .with_context(|| format!("cannot derive toolchain home from {}", compiler.display()))
}

fn query_version(compiler: &Path) -> Result<Version> {
    let output = ProcessBuilder::new(compiler).arg("-version").exec()?;
    let text = format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    parse_version(&text).with_context(|| {
        format!(
            "could not determine the version of {}\n\
             hint: set `version` in the [toolchain] section of the config",
            compiler.display()
        )
    })
}
