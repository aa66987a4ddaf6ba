//! Configuration file support for Aotpack.
//!
//! Aotpack supports two configuration file locations:
//! - Global: `~/.aotpack/config.toml` - User-wide defaults
//! - Project: `.aotpack/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Aotpack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AOT toolchain location and version
    pub toolchain: ToolchainSettings,

    /// Toolchain versions that unlock capabilities
    pub capabilities: CapabilitySettings,

    /// Build settings
    pub build: BuildConfig,
}

/// `[toolchain]` settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ToolchainSettings {
    /// Toolchain installation directory (contains `bin/jc`)
    pub home: Option<PathBuf>,

    /// Toolchain version, skips running `jc -version`
    pub version: Option<String>,

    /// Target OS (windows, linux, macos); defaults to the host
    pub target_os: Option<String>,
}

/// `[capabilities]` settings.
///
/// Each entry is the first toolchain version that has the capability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CapabilitySettings {
    pub native_zip_since: Option<String>,
    pub runtime_reduction_zip_since: Option<String>,
    pub response_files_since: Option<String>,
    pub pgo_since: Option<String>,
}

/// `[build]` settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildConfig {
    /// Default message format (human, json)
    pub message_format: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        // Toolchain
        if other.toolchain.home.is_some() {
            self.toolchain.home = other.toolchain.home;
        }
        if other.toolchain.version.is_some() {
            self.toolchain.version = other.toolchain.version;
        }
        if other.toolchain.target_os.is_some() {
            self.toolchain.target_os = other.toolchain.target_os;
        }

        // Capabilities
        let caps = other.capabilities;
        if caps.native_zip_since.is_some() {
            self.capabilities.native_zip_since = caps.native_zip_since;
        }
        if caps.runtime_reduction_zip_since.is_some() {
            self.capabilities.runtime_reduction_zip_since = caps.runtime_reduction_zip_since;
        }
        if caps.response_files_since.is_some() {
            self.capabilities.response_files_since = caps.response_files_since;
        }
        if caps.pgo_since.is_some() {
            self.capabilities.pgo_since = caps.pgo_since;
        }

        // Build
        if other.build.message_format.is_some() {
            self.build.message_format = other.build.message_format;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.aotpack/config.toml)
/// 2. Global config (~/.aotpack/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global aotpack config directory (~/.aotpack).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".aotpack"))
}

/// Get the project config path (.aotpack/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".aotpack").join("config.toml")
}
