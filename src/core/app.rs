//! Application and packaging kinds.
//!
//! Each application kind carries exactly the inputs it needs, so the
//! stager, compiler project writer and packagers match on it exhaustively.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of application being compiled, with its kind-specific inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ApplicationKind {
    /// A regular executable with a main class.
    Plain(ClasspathApp),
    /// A shared library without an entry point.
    DynamicLibrary(ClasspathApp),
    /// A Windows service.
    WindowsService(WindowsService),
    /// A servlet container home plus a web archive deployed into it.
    ServletContainer(ServletContainer),
    /// A single artifact packaged by an application framework.
    FrameworkApp(FrameworkApp),
}

/// Classpath-based application inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClasspathApp {
    /// Fully qualified main class (not used by dynamic libraries)
    #[serde(default)]
    pub main_class: Option<String>,

    /// Glob patterns for classpath entries, relative to the project root
    #[serde(default)]
    pub classpath: Vec<String>,
}

/// How a Windows service starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceStartType {
    #[default]
    Automatic,
    Manual,
    Disabled,
}

/// Windows service definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WindowsService {
    pub main_class: String,

    #[serde(default)]
    pub classpath: Vec<String>,

    /// Service name used by the service control manager
    pub name: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Arguments passed to the service on start
    #[serde(default)]
    pub arguments: Vec<String>,

    #[serde(default)]
    pub start_type: ServiceStartType,

    #[serde(default = "default_true")]
    pub start_after_install: bool,

    /// Names of services this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Servlet container application inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ServletContainer {
    /// Container installation directory
    pub home: PathBuf,

    /// Web archive deployed into the container's `webapps/`
    pub war: PathBuf,
}

/// Framework-packaged application inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrameworkApp {
    pub artifact: PathBuf,
}

fn default_true() -> bool {
    true
}

impl ApplicationKind {
    /// Short kebab-case name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationKind::Plain(_) => "plain",
            ApplicationKind::DynamicLibrary(_) => "dynamic-library",
            ApplicationKind::WindowsService(_) => "windows-service",
            ApplicationKind::ServletContainer(_) => "servlet-container",
            ApplicationKind::FrameworkApp(_) => "framework-app",
        }
    }

    /// Whether the built image can be started directly as a foreground process.
    pub fn is_directly_runnable(&self) -> bool {
        match self {
            ApplicationKind::Plain(_)
            | ApplicationKind::ServletContainer(_)
            | ApplicationKind::FrameworkApp(_) => true,
            ApplicationKind::DynamicLibrary(_) | ApplicationKind::WindowsService(_) => false,
        }
    }

    pub fn is_windows_service(&self) -> bool {
        matches!(self, ApplicationKind::WindowsService(_))
    }

    /// Classpath patterns for classpath-based kinds.
    pub fn classpath(&self) -> Option<&[String]> {
        match self {
            ApplicationKind::Plain(app) | ApplicationKind::DynamicLibrary(app) => {
                Some(&app.classpath)
            }
            ApplicationKind::WindowsService(service) => Some(&service.classpath),
            ApplicationKind::ServletContainer(_) | ApplicationKind::FrameworkApp(_) => None,
        }
    }

    /// The main class, for kinds that have one.
    pub fn main_class(&self) -> Option<&str> {
        match self {
            ApplicationKind::Plain(app) => app.main_class.as_deref(),
            ApplicationKind::WindowsService(service) => Some(&service.main_class),
            ApplicationKind::DynamicLibrary(_)
            | ApplicationKind::ServletContainer(_)
            | ApplicationKind::FrameworkApp(_) => None,
        }
    }
}

impl fmt::Display for ApplicationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The distributable format the build produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackagingKind {
    /// A self-contained directory
    Directory,
    /// The self-contained directory compressed into a `.zip`
    #[default]
    Zip,
    /// The self-contained directory compressed into a `.tar.gz`
    TarGz,
    /// A platform installer executable
    NativeInstaller,
    /// A macOS `.app` bundle, optionally signed and wrapped in a `.pkg`
    MacosAppBundle,
}

impl PackagingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingKind::Directory => "directory",
            PackagingKind::Zip => "zip",
            PackagingKind::TarGz => "tar-gz",
            PackagingKind::NativeInstaller => "native-installer",
            PackagingKind::MacosAppBundle => "macos-app-bundle",
        }
    }
}

impl fmt::Display for PackagingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackagingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "directory" | "none" => Ok(PackagingKind::Directory),
            "zip" => Ok(PackagingKind::Zip),
            "tar-gz" | "tar.gz" => Ok(PackagingKind::TarGz),
            "native-installer" | "installer" => Ok(PackagingKind::NativeInstaller),
            "macos-app-bundle" | "app-bundle" => Ok(PackagingKind::MacosAppBundle),
            _ => Err(format!(
                "invalid packaging '{}', valid values: directory, zip, tar-gz, native-installer, macos-app-bundle",
                s
            )),
        }
    }
}

/// Operating system the native image targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    Linux,
    Macos,
}

impl TargetOs {
    /// The OS this binary was built for.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::Macos
        } else {
            TargetOs::Linux
        }
    }

    /// Append the platform executable suffix to `name`.
    pub fn exe_name(&self, name: &str) -> String {
        match self {
            TargetOs::Windows if !name.to_lowercase().ends_with(".exe") => {
                format!("{}.exe", name)
            }
            _ => name.to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
            TargetOs::Macos => "macos",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "windows" => Ok(TargetOs::Windows),
            "linux" => Ok(TargetOs::Linux),
            "macos" | "osx" => Ok(TargetOs::Macos),
            _ => Err(format!(
                "invalid target OS '{}', valid values: windows, linux, macos",
                s
            )),
        }
    }
}

/// How much stack trace information the native image keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackTraceSupport {
    #[default]
    Minimal,
    Full,
    None,
}

impl fmt::Display for StackTraceSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackTraceSupport::Minimal => write!(f, "minimal"),
            StackTraceSupport::Full => write!(f, "full"),
            StackTraceSupport::None => write!(f, "none"),
        }
    }
}

/// Native installer post-install action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostInstallActionKind {
    Run,
    Open,
    Restart,
}

/// An action offered on the installer's last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PostInstallAction {
    #[serde(rename = "type")]
    pub kind: PostInstallActionKind,

    /// Installed file to run or open (unused for restart)
    #[serde(default)]
    pub target: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    /// Whether the checkbox starts checked
    #[serde(default = "default_true")]
    pub checked: bool,
}
