//! The project descriptor: a loaded manifest plus every path derived from it.
//!
//! `Project` is the only thing the build reads configuration from. It also
//! stages the application inputs into the build directory.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::app::{ApplicationKind, PackagingKind, TargetOs};
use crate::core::errors::{BuildError, BuildResult};
use crate::core::manifest::{
    InstallerSettings, MacosBundleSettings, Manifest, RuntimeSettings,
};
use crate::core::profiles::ProfileArtifacts;
use crate::util::fs::{copy_dir_all, copy_file, ensure_dir, glob_files};

/// Directory below the build directory that receives classpath entries.
pub const LIB_DIR: &str = "lib";

/// A loaded project.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory containing the manifest
    root: PathBuf,

    manifest: Manifest,

    /// Profile files, possibly updated by a local profiling run
    profiles: ProfileArtifacts,
}

/// Inputs staged into the build directory for compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedInputs {
    /// Staged entries, relative to the build directory
    pub entries: Vec<PathBuf>,
}

impl Project {
    /// Load the project whose manifest is at `manifest_path`.
    pub fn load(manifest_path: &Path) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Project::new(root, manifest))
    }

    pub fn new(root: impl Into<PathBuf>, manifest: Manifest) -> Self {
        let root = root.into();
        let output_name = manifest
            .profiles
            .output_name
            .clone()
            .or_else(|| manifest.package.output_name.clone())
            .unwrap_or_else(|| manifest.package.name.clone());
        let profiles = ProfileArtifacts::new(&root.join(&manifest.profiles.output_dir), &output_name);

        Project {
            root,
            manifest,
            profiles,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn name(&self) -> &str {
        &self.manifest.package.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.package.version
    }

    pub fn vendor(&self) -> Option<&str> {
        self.manifest.package.vendor.as_deref()
    }

    /// Product name shown by installers.
    pub fn product(&self) -> &str {
        self.manifest.package.product.as_deref().unwrap_or(self.name())
    }

    /// Base name of the final artifact.
    pub fn artifact_name(&self) -> &str {
        self.manifest
            .package
            .artifact_name
            .as_deref()
            .unwrap_or(self.name())
    }

    /// Base name of the native executable and the compiler project file.
    pub fn output_name(&self) -> &str {
        self.manifest
            .package
            .output_name
            .as_deref()
            .unwrap_or(self.name())
    }

    pub fn app(&self) -> &ApplicationKind {
        &self.manifest.app
    }

    pub fn packaging(&self) -> PackagingKind {
        self.manifest.packaging.kind
    }

    pub fn runtime(&self) -> &RuntimeSettings {
        &self.manifest.runtime
    }

    pub fn installer(&self) -> &InstallerSettings {
        &self.manifest.installer
    }

    pub fn macos_bundle(&self) -> Option<&MacosBundleSettings> {
        self.manifest.macos_bundle.as_ref()
    }

    /// Extra files added to every package.
    pub fn package_files(&self) -> Option<PathBuf> {
        self.manifest
            .packaging
            .package_files
            .as_ref()
            .map(|p| self.root.join(p))
    }

    pub fn stack_trace_support(&self) -> crate::core::app::StackTraceSupport {
        self.manifest.build.stack_trace_support
    }

    pub fn compiler_options(&self) -> &[String] {
        &self.manifest.build.compiler_options
    }

    /// Root of every build output.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.build.output_dir)
    }

    /// Working directory the compiler runs in.
    pub fn build_dir(&self) -> PathBuf {
        self.output_dir().join("build")
    }

    /// Self-contained application directory of production builds.
    pub fn app_dir(&self) -> PathBuf {
        self.output_dir().join("app")
    }

    /// Self-contained directory of the instrumented image.
    pub fn profiling_image_dir(&self) -> PathBuf {
        match &self.manifest.profiles.profiling_image_dir {
            Some(dir) => self.root.join(dir),
            None => self.output_dir().join("app-to-profile"),
        }
    }

    /// Directory the execution profiles are stored in.
    pub fn profiles_dir(&self) -> PathBuf {
        self.root.join(&self.manifest.profiles.output_dir)
    }

    pub fn profiles(&self) -> &ProfileArtifacts {
        &self.profiles
    }

    pub fn profiles_mut(&mut self) -> &mut ProfileArtifacts {
        &mut self.profiles
    }

    pub fn profile_locally(&self) -> bool {
        self.manifest.profiles.profile_locally
    }

    pub fn days_to_warn_about_outdated_profiles(&self) -> i64 {
        self.manifest.profiles.days_to_warn_about_outdated_profiles
    }

    pub fn profiling_run_args(&self) -> &[String] {
        &self.manifest.profiles.run_args
    }

    /// File name of the native image the compiler produces.
    pub fn image_name(&self, target_os: TargetOs) -> String {
        let name = self.output_name();
        match (self.app(), target_os) {
            (ApplicationKind::DynamicLibrary(_), TargetOs::Windows) => format!("{}.dll", name),
            (ApplicationKind::DynamicLibrary(_), TargetOs::Linux) => format!("lib{}.so", name),
            (ApplicationKind::DynamicLibrary(_), TargetOs::Macos) => format!("lib{}.dylib", name),
            _ => target_os.exe_name(name),
        }
    }

    /// Path of the native executable relative to the application image.
    ///
    /// A servlet container keeps its launcher under `<container>/bin/`;
    /// every other kind has the image at the root.
    pub fn executable_path(&self, target_os: TargetOs) -> PathBuf {
        let image = self.image_name(target_os);
        match self.app() {
            ApplicationKind::ServletContainer(container) => match container.home.file_name() {
                Some(dir) => Path::new(dir).join("bin").join(image),
                None => PathBuf::from(image),
            },
            _ => PathBuf::from(image),
        }
    }

    /// Artifact the execution profiles are compared against for staleness.
    ///
    /// The configured main artifact, or else the primary application input.
    pub fn main_artifact(&self) -> Option<PathBuf> {
        if let Some(path) = &self.manifest.build.main_artifact {
            return Some(self.root.join(path));
        }
        match self.app() {
            ApplicationKind::ServletContainer(c) => Some(self.root.join(&c.war)),
            ApplicationKind::FrameworkApp(f) => Some(self.root.join(&f.artifact)),
            kind => kind
                .classpath()
                .and_then(|patterns| glob_files(&self.root, patterns).ok())
                .and_then(|files| files.into_iter().next()),
        }
    }

    /// Check the configuration against the toolchain target before any tool runs.
    pub fn validate(&self, target_os: TargetOs, profiling: bool) -> BuildResult<()> {
        if self.name().trim().is_empty() {
            return Err(BuildError::validation("package name must not be empty"));
        }
        if self.artifact_name().trim().is_empty() || self.output_name().trim().is_empty() {
            return Err(BuildError::validation(
                "artifact and output names must not be empty",
            ));
        }

        self.validate_inputs()?;
        self.validate_target(target_os, profiling)?;
        self.validate_runtime()?;

        if let Some(dir) = self.package_files() {
            if !dir.is_dir() {
                return Err(BuildError::validation(format!(
                    "package files directory `{}` does not exist",
                    dir.display()
                )));
            }
        }
        if let Some(eula) = &self.installer().eula {
            let eula = self.root.join(eula);
            if !eula.is_file() {
                return Err(BuildError::validation(format!(
                    "end user license agreement `{}` does not exist",
                    eula.display()
                )));
            }
        }

        Ok(())
    }

    fn validate_inputs(&self) -> BuildResult<()> {
        match self.app() {
            ApplicationKind::Plain(app) => {
                if app.main_class.as_deref().map_or(true, str::is_empty) {
                    return Err(BuildError::validation_with_help(
                        "a plain application needs a main class",
                        "set `main-class` in the [app] section",
                    ));
                }
                self.validate_classpath(&app.classpath)
            }
            ApplicationKind::DynamicLibrary(app) => self.validate_classpath(&app.classpath),
            ApplicationKind::WindowsService(service) => {
                if service.main_class.is_empty() || service.name.is_empty() {
                    return Err(BuildError::validation(
                        "a Windows service needs a main class and a service name",
                    ));
                }
                self.validate_classpath(&service.classpath)
            }
            ApplicationKind::ServletContainer(container) => {
                let home = self.root.join(&container.home);
                if !home.is_dir() {
                    return Err(BuildError::validation(format!(
                        "servlet container home `{}` does not exist",
                        home.display()
                    )));
                }
                let war = self.root.join(&container.war);
                if !war.is_file() {
                    return Err(BuildError::validation_with_help(
                        format!("web archive `{}` does not exist", war.display()),
                        "build the web archive before running aotpack",
                    ));
                }
                Ok(())
            }
            ApplicationKind::FrameworkApp(app) => {
                let artifact = self.root.join(&app.artifact);
                if !artifact.is_file() {
                    return Err(BuildError::validation_with_help(
                        format!("application artifact `{}` does not exist", artifact.display()),
                        "build the application artifact before running aotpack",
                    ));
                }
                Ok(())
            }
        }
    }

    fn validate_classpath(&self, patterns: &[String]) -> BuildResult<()> {
        let files = glob_files(&self.root, patterns)
            .map_err(|e| BuildError::validation(format!("{:#}", e)))?;
        if files.is_empty() {
            return Err(BuildError::validation_with_help(
                "no classpath entries found",
                "check the `classpath` patterns in the [app] section",
            ));
        }
        Ok(())
    }

    fn validate_target(&self, target_os: TargetOs, profiling: bool) -> BuildResult<()> {
        let packaging = self.packaging();

        if self.app().is_windows_service() && target_os != TargetOs::Windows {
            return Err(BuildError::validation(format!(
                "Windows services cannot be built for {}",
                target_os
            )));
        }

        match packaging {
            PackagingKind::MacosAppBundle => {
                if target_os != TargetOs::Macos {
                    return Err(BuildError::validation(format!(
                        "macOS application bundles cannot be built for {}",
                        target_os
                    )));
                }
                if self.app().is_windows_service() {
                    return Err(BuildError::validation(
                        "a Windows service cannot be packaged as a macOS application bundle",
                    ));
                }
                let Some(bundle) = self.macos_bundle() else {
                    return Err(BuildError::validation_with_help(
                        "macOS application bundle packaging needs bundle metadata",
                        "add a [macos-bundle] section with an `identifier`",
                    ));
                };
                if bundle.identifier.trim().is_empty() {
                    return Err(BuildError::validation("macOS bundle identifier must not be empty"));
                }
                if bundle.bundle_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                    return Err(BuildError::validation("macOS bundle name must not be empty"));
                }
                if let Some(icon) = &bundle.icon {
                    let icon = self.root.join(icon);
                    if !icon.is_file() {
                        return Err(BuildError::validation(format!(
                            "macOS bundle icon `{}` does not exist",
                            icon.display()
                        )));
                    }
                }
                if profiling && matches!(self.app(), ApplicationKind::DynamicLibrary(_)) {
                    return Err(BuildError::validation(
                        "a dynamic library packaged as a macOS application bundle cannot be profiled",
                    ));
                }
            }
            PackagingKind::NativeInstaller if target_os == TargetOs::Macos => {
                return Err(BuildError::validation_with_help(
                    "native installers are not available for macOS",
                    "use `macos-app-bundle` packaging instead",
                ));
            }
            _ => {}
        }

        Ok(())
    }

    fn validate_runtime(&self) -> BuildResult<()> {
        if let Some(slim_down) = &self.runtime().slim_down {
            if slim_down.detached_package.trim().is_empty() {
                return Err(BuildError::validation("slim-down detached package name must not be empty"));
            }
            url::Url::parse(&slim_down.detached_base_url).map_err(|e| {
                BuildError::validation(format!(
                    "slim-down base URL `{}` is malformed: {}",
                    slim_down.detached_base_url, e
                ))
            })?;
        }
        Ok(())
    }

    /// Copy the application inputs into `build_dir`.
    pub fn stage_inputs(&self, build_dir: &Path) -> Result<StagedInputs> {
        match self.app() {
            ApplicationKind::Plain(_)
            | ApplicationKind::DynamicLibrary(_)
            | ApplicationKind::WindowsService(_) => self.copy_classpath_entries(build_dir),
            ApplicationKind::ServletContainer(_) => self.copy_container_and_war(build_dir),
            ApplicationKind::FrameworkApp(_) => self.copy_framework_artifact(build_dir),
        }
    }

    /// Copy every classpath entry into `<build>/lib/`.
    pub fn copy_classpath_entries(&self, build_dir: &Path) -> Result<StagedInputs> {
        let patterns = self.app().classpath().unwrap_or_default();
        let lib_dir = build_dir.join(LIB_DIR);
        ensure_dir(&lib_dir)?;

        let mut staged = StagedInputs::default();
        let mut taken = HashSet::new();
        for file in glob_files(&self.root, patterns)? {
            let file_name = file
                .file_name()
                .with_context(|| format!("classpath entry has no file name: {}", file.display()))?;
            let staged_name = unique_file_name(Path::new(file_name), &mut taken);
            if staged_name.as_os_str() != file_name {
                tracing::debug!(
                    "Staging {} as {} to avoid a name clash",
                    file.display(),
                    staged_name.display()
                );
            }
            copy_file(&file, &lib_dir.join(&staged_name))?;
            staged.entries.push(Path::new(LIB_DIR).join(staged_name));
        }
        tracing::debug!("Staged {} classpath entries", staged.entries.len());
        Ok(staged)
    }

    /// Copy the servlet container into the build directory and deploy the
    /// web archive into its `webapps/`.
    pub fn copy_container_and_war(&self, build_dir: &Path) -> Result<StagedInputs> {
        let ApplicationKind::ServletContainer(container) = self.app() else {
            anyhow::bail!("project `{}` is not a servlet container application", self.name());
        };
        let home = self.root.join(&container.home);
        let home_name = home
            .file_name()
            .with_context(|| format!("container home has no name: {}", home.display()))?;
        let staged_home = build_dir.join(home_name);
        copy_dir_all(&home, &staged_home)?;

        let war = self.root.join(&container.war);
        let war_name = war
            .file_name()
            .with_context(|| format!("web archive has no file name: {}", war.display()))?;
        copy_file(&war, &staged_home.join("webapps").join(war_name))?;

        Ok(StagedInputs {
            entries: vec![PathBuf::from(home_name)],
        })
    }

    /// Copy the framework-packaged artifact into the build directory.
    pub fn copy_framework_artifact(&self, build_dir: &Path) -> Result<StagedInputs> {
        let ApplicationKind::FrameworkApp(app) = self.app() else {
            anyhow::bail!("project `{}` is not a framework application", self.name());
        };
        let artifact = self.root.join(&app.artifact);
        let name = artifact
            .file_name()
            .with_context(|| format!("artifact has no file name: {}", artifact.display()))?;
        copy_file(&artifact, &build_dir.join(name))?;
        Ok(StagedInputs {
            entries: vec![PathBuf::from(name)],
        })
    }
}

/// `name`, or `<stem>-<n>.<ext>` with the smallest `n` not yet in `taken`.
fn unique_file_name(name: &Path, taken: &mut HashSet<OsString>) -> PathBuf {
    let mut candidate = name.as_os_str().to_owned();
    let mut n = 1;
    while taken.contains(&candidate) {
        let mut next = name.file_stem().unwrap_or(name.as_os_str()).to_owned();
        next.push(format!("-{}", n));
        if let Some(ext) = name.extension() {
            next.push(".");
            next.push(ext);
        }
        candidate = next;
        n += 1;
    }
    taken.insert(candidate.clone());
    PathBuf::from(candidate)
}
