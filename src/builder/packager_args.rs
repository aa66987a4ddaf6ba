//! Packager (`xpack`) options.
//!
//! High-level packaging intents become a [`PackagingOptionSet`]: an ordered
//! list of options that is either written to a response file and passed as
//! `-arg-file <path>`, or flattened onto the command line.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::invoker::CommandSpec;
use crate::builder::toolchain::{Toolchain, ToolchainCapabilities};
use crate::core::app::{ApplicationKind, PostInstallActionKind, ServiceStartType};
use crate::core::project::Project;
use crate::util::fs::write_lines;

/// A single packager option with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerOption {
    /// Option name including the leading dash
    pub name: String,
    pub params: Vec<String>,
}

impl PackagerOption {
    pub fn flag(name: impl Into<String>) -> Self {
        PackagerOption {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn new(name: impl Into<String>, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        PackagerOption {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// The option as one response file line. Parameters containing
    /// whitespace or quotes are quoted.
    pub fn to_response_line(&self) -> String {
        let mut line = self.name.clone();
        for param in &self.params {
            line.push(' ');
            line.push_str(&quote(param));
        }
        line
    }
}

impl fmt::Display for PackagerOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_response_line())
    }
}

fn quote(param: &str) -> String {
    if param.is_empty() || param.contains(char::is_whitespace) || param.contains('"') {
        format!("\"{}\"", param.replace('"', "\\\""))
    } else {
        param.to_string()
    }
}

/// Options for one packager invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagingOptionSet {
    pub options: Vec<PackagerOption>,

    /// Where the options are written when response files are supported
    pub response_file: Option<PathBuf>,
}

impl PackagingOptionSet {
    pub fn new(options: Vec<PackagerOption>) -> Self {
        PackagingOptionSet {
            options,
            response_file: None,
        }
    }

    /// Route the options through a response file at `path`.
    pub fn with_response_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.response_file = Some(path.into());
        self
    }

    pub fn push(&mut self, option: PackagerOption) {
        self.options.push(option);
    }

    /// Response file contents, one option per line.
    pub fn response_file_lines(&self) -> Vec<String> {
        self.options.iter().map(PackagerOption::to_response_line).collect()
    }

    /// Every option and parameter as separate command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        self.options
            .iter()
            .flat_map(|o| std::iter::once(o.name.clone()).chain(o.params.iter().cloned()))
            .collect()
    }

    /// Turn the set into packager arguments, writing the response file if one
    /// is configured.
    pub fn into_args(self) -> Result<Vec<String>> {
        match &self.response_file {
            Some(path) => {
                write_lines(path, &self.response_file_lines(), "\n")?;
                Ok(vec!["-arg-file".to_string(), path.display().to_string()])
            }
            None => Ok(self.to_args()),
        }
    }
}

/// Generates packager options from the project configuration.
#[derive(Debug)]
pub struct PackagerArgsGenerator<'a> {
    project: &'a Project,
    toolchain: &'a Toolchain,
}

impl<'a> PackagerArgsGenerator<'a> {
    pub fn new(project: &'a Project, toolchain: &'a Toolchain) -> Self {
        PackagerArgsGenerator { project, toolchain }
    }

    /// Options that package the compiled image into `target_dir`.
    pub fn common_options(&self, target_dir: &Path) -> Vec<PackagerOption> {
        let mut options = self.content_options();
        options.push(PackagerOption::new("-target", [path_str(target_dir)]));
        options
    }

    /// Options that package the compiled image into the installer `target_file`.
    pub fn installer_options(&self, target_file: &Path) -> Vec<PackagerOption> {
        let project = self.project;
        let installer = project.installer();
        let mut options = self.content_options();

        options.push(PackagerOption::new("-backend", ["excelsior-installer"]));
        if let Some(vendor) = project.vendor() {
            options.push(PackagerOption::new("-company", [vendor]));
        }
        options.push(PackagerOption::new("-product", [project.product()]));
        options.push(PackagerOption::new("-version", [project.version()]));
        if let Some(language) = &installer.language {
            options.push(PackagerOption::new("-language", [language.as_str()]));
        }
        if let Some(dir) = &installer.install_dir {
            options.push(PackagerOption::new("-install-directory", [dir.as_str()]));
        }
        if installer.cleanup_after_uninstall {
            options.push(PackagerOption::flag("-cleanup-after-uninstall"));
        }
        if let Some(eula) = &installer.eula {
            options.push(PackagerOption::new("-eula", [path_str(&project.root().join(eula))]));
        }

        if let ApplicationKind::WindowsService(service) = project.app() {
            let exe = project.image_name(self.toolchain.target_os());
            options.push(PackagerOption::new(
                "-service",
                [
                    exe,
                    service.name.clone(),
                    service.display_name.clone().unwrap_or_else(|| service.name.clone()),
                    service.description.clone().unwrap_or_default(),
                ],
            ));
            let start_type = match service.start_type {
                ServiceStartType::Automatic => "automatic",
                ServiceStartType::Manual => "manual",
                ServiceStartType::Disabled => "disabled",
            };
            options.push(PackagerOption::new(
                "-service-startup",
                [start_type, on_off(service.start_after_install)],
            ));
            if !service.dependencies.is_empty() {
                options.push(PackagerOption::new(
                    "-service-dependencies",
                    [service.dependencies.join(",")],
                ));
            }
        }

        for action in &installer.post_install {
            let checked = on_off(action.checked);
            let option = match action.kind {
                PostInstallActionKind::Run => PackagerOption::new(
                    "-post-install-checkbox-run",
                    [
                        action.target.clone().unwrap_or_default(),
                        action.args.join(" "),
                        checked.to_string(),
                    ],
                ),
                PostInstallActionKind::Open => PackagerOption::new(
                    "-post-install-checkbox-open",
                    [action.target.clone().unwrap_or_default(), checked.to_string()],
                ),
                PostInstallActionKind::Restart => {
                    PackagerOption::new("-post-install-checkbox-restart", [checked])
                }
            };
            options.push(option);
        }

        options.push(PackagerOption::new("-target", [path_str(target_file)]));
        options
    }

    /// Files and runtime settings shared by every packaging format.
    fn content_options(&self) -> Vec<PackagerOption> {
        let project = self.project;
        let mut options = Vec::new();

        match project.app() {
            ApplicationKind::ServletContainer(container) => {
                let dir = container
                    .home
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path_str(&container.home));
                options.push(PackagerOption::new("-add-file", [dir, "/".to_string()]));
            }
            _ => options.push(PackagerOption::new(
                "-add-file",
                [project.image_name(self.toolchain.target_os()), "/".to_string()],
            )),
        }

        if let Some(files) = project.package_files() {
            options.push(PackagerOption::new("-add-file", [path_str(&files), "/".to_string()]));
        }

        let runtime = project.runtime();
        if let Some(mode) = &runtime.disk_footprint_reduction {
            options.push(PackagerOption::new("-reduce-disk-footprint", [mode.as_str()]));
        }
        if let Some(slim_down) = &runtime.slim_down {
            if !slim_down.components.is_empty() {
                options.push(PackagerOption::new(
                    "-detach-components",
                    [slim_down.components.join(",")],
                ));
            }
            options.push(PackagerOption::new(
                "-detached-base-url",
                [slim_down.detached_base_url.as_str()],
            ));
            options.push(PackagerOption::new(
                "-detached-package",
                [path_str(&project.output_dir().join(&slim_down.detached_package))],
            ));
        }

        options
    }

    /// Wrap `options` in an option set that uses a response file at
    /// `<build>/<output-name><suffix>.xpack` when the toolchain supports it.
    pub fn option_set(&self, options: Vec<PackagerOption>, suffix: &str) -> PackagingOptionSet {
        let set = PackagingOptionSet::new(options);
        if self.toolchain.supports_response_files() {
            let file = self
                .project
                .build_dir()
                .join(format!("{}{}.xpack", self.project.output_name(), suffix));
            set.with_response_file(file)
        } else {
            set
        }
    }

    /// The packager command for `set`, plus any trailing arguments.
    pub fn pack_command(
        &self,
        set: PackagingOptionSet,
        trailing: &[&str],
    ) -> Result<CommandSpec> {
        let args = set.into_args()?;
        Ok(CommandSpec::new(self.toolchain.packager())
            .args(args)
            .args(trailing.iter().copied()))
    }
}

fn path_str(path: &Path) -> String {
    path.display().to_string()
}

fn on_off(value: bool) -> &'static str {
    if value {
        "checked"
    } else {
        "unchecked"
    }
}
