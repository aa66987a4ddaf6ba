//! Compiler project file and command line.
//!
//! The compiler reads its configuration from a `.prj` file in the build
//! directory and is run as `jc =p <prj> [-jetvmprop=<props>]`.

use std::path::Path;

use crate::builder::invoker::CommandSpec;
use crate::builder::toolchain::{Toolchain, ToolchainCapabilities};
use crate::core::app::{ApplicationKind, StackTraceSupport};
use crate::core::project::{Project, StagedInputs};

/// Generates the compiler inputs for one build.
#[derive(Debug)]
pub struct CompilerArgsGenerator<'a> {
    project: &'a Project,
    profiling: bool,
    supports_pgo: bool,
}

impl<'a> CompilerArgsGenerator<'a> {
    pub fn new(project: &'a Project, toolchain: &Toolchain, profiling: bool) -> Self {
        CompilerArgsGenerator {
            project,
            profiling,
            supports_pgo: toolchain.supports_pgo(),
        }
    }

    /// File name of the project file, `<output-name>.prj`.
    pub fn project_file_name(&self) -> String {
        format!("{}.prj", self.project.output_name())
    }

    /// Contents of the compiler project file.
    pub fn project_file_content(&self, staged: &StagedInputs) -> String {
        let mut lines = vec![
            format!("-outputname={}", self.project.output_name()),
            "-decor=ht".to_string(),
        ];

        match self.project.stack_trace_support() {
            StackTraceSupport::Minimal => {}
            StackTraceSupport::Full => lines.push("-genstacktrace+".to_string()),
            StackTraceSupport::None => lines.push("-disablestacktrace+".to_string()),
        }

        match self.project.app() {
            ApplicationKind::Plain(app) => {
                if let Some(main) = &app.main_class {
                    lines.push(format!("-main={}", main));
                }
            }
            ApplicationKind::DynamicLibrary(_) => lines.push("-gendll+".to_string()),
            ApplicationKind::WindowsService(service) => {
                lines.push(format!("-servicemain={}", service.main_class));
                lines.push(format!("-servicename={}", service.name));
            }
            ApplicationKind::ServletContainer(_) => {
                lines.push("-apptype=tomcat".to_string());
                if let Some(home) = staged.entries.first() {
                    lines.push(format!("-appdir={}", prj_path(home)));
                }
            }
            ApplicationKind::FrameworkApp(_) => lines.push("-apptype=spring-boot".to_string()),
        }

        if !self.profiling {
            lines.extend(self.profile_options());
        }

        lines.extend(self.project.compiler_options().iter().cloned());

        if !matches!(self.project.app(), ApplicationKind::ServletContainer(_)) {
            for entry in &staged.entries {
                lines.push(format!("!classpathentry {}", prj_path(entry)));
                lines.push("  -optimize=all".to_string());
                lines.push("  -protect=nomatter".to_string());
                lines.push("!end".to_string());
            }
        }

        let mut content = lines.join("\n");
        content.push('\n');
        content
    }

    /// Options that feed previously collected profiles into the compiler.
    fn profile_options(&self) -> Vec<String> {
        let profiles = self.project.profiles();
        let mut options = Vec::new();
        if profiles.startup.exists() {
            options.push(format!("-startupprofile={}", profiles.startup.display()));
        }
        if profiles.usage.exists() {
            options.push(format!("!module {}", profiles.usage.display()));
        }
        if self.supports_pgo && profiles.jit.exists() {
            options.push("-pgo+".to_string());
            options.push(format!("-jprofile={}", profiles.jit.display()));
        }
        options
    }

    /// The `-jetvmprop=` option, when this run needs one.
    ///
    /// Profiling runs enable instrumentation and point the runtime at the
    /// profile files it should write.
    pub fn jetvmprop_option(&self) -> Option<String> {
        if !self.profiling {
            return None;
        }
        let profiles = self.project.profiles();
        Some(format!(
            "-jetvmprop=-Djet.jit.profiling -Djet.profiler.jprof={} -Djet.usage.list={}",
            profiles.jit.display(),
            profiles.usage.display()
        ))
    }

    /// The compiler command for the project file written by this generator.
    pub fn compile_command(&self, toolchain: &Toolchain) -> CommandSpec {
        let mut cmd = CommandSpec::new(toolchain.compiler())
            .arg("=p")
            .arg(self.project_file_name());
        if let Some(prop) = self.jetvmprop_option() {
            cmd = cmd.arg(prop);
        }
        cmd
    }
}

/// Path as written into the project file, always `/`-separated.
fn prj_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
