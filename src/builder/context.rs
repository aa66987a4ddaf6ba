//! Build context - project, toolchain, tool invoker and message sink.

use std::fmt;
use std::path::Path;

use crate::builder::invoker::{CommandSpec, ToolInvoker};
use crate::builder::packager_args::{PackagerArgsGenerator, PackagingOptionSet};
use crate::builder::toolchain::Toolchain;
use crate::core::errors::{BuildError, BuildResult};
use crate::core::project::Project;
use crate::util::messages::Reporter;

/// Everything one build step needs, borrowed for the duration of the step.
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
    pub project: &'a Project,
    pub toolchain: &'a Toolchain,
    pub invoker: &'a dyn ToolInvoker,
    pub reporter: &'a Reporter<'a>,
}

impl fmt::Debug for BuildContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("project", &self.project.name())
            .field("toolchain", &self.toolchain)
            .field("reporter", &self.reporter)
            .finish()
    }
}

impl<'a> BuildContext<'a> {
    pub fn new(
        project: &'a Project,
        toolchain: &'a Toolchain,
        invoker: &'a dyn ToolInvoker,
        reporter: &'a Reporter<'a>,
    ) -> Self {
        BuildContext {
            project,
            toolchain,
            invoker,
            reporter,
        }
    }

    /// Packager option generator for this project.
    pub fn packager_args(&self) -> PackagerArgsGenerator<'a> {
        PackagerArgsGenerator::new(self.project, self.toolchain)
    }

    /// Run the packager in the build directory.
    ///
    /// A non-zero exit is a packaging failure.
    pub fn pack(&self, set: PackagingOptionSet, trailing: &[&str]) -> BuildResult<()> {
        let cmd = self.packager_args().pack_command(set, trailing)?;
        self.run_checked(&cmd, &self.project.build_dir(), "package.failure")
    }

    /// Run `cmd` in `cwd`; a non-zero exit is a packaging failure with the
    /// message `failure_key`.
    pub fn run_checked(&self, cmd: &CommandSpec, cwd: &Path, failure_key: &str) -> BuildResult<()> {
        let code = self.invoker.invoke(cmd, cwd)?;
        if code != 0 {
            return Err(BuildError::Packaging {
                message: self.reporter.text(failure_key, &[]),
            });
        }
        Ok(())
    }
}
