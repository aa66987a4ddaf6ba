//! Running external tools.
//!
//! The build never spawns processes directly; it hands a [`CommandSpec`] to a
//! [`ToolInvoker`]. Tests substitute a scripted invoker.

use std::path::{Path, PathBuf};

use crate::core::errors::{BuildError, BuildResult};
use crate::util::process::{OutputStream, ProcessBuilder};

/// A command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g. `jc`, `xpack`, `codesign`)
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
    /// Environment variables to set
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Add an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// File name of the program, for messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }

    /// The command line as a single string.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Runs external tools to completion.
pub trait ToolInvoker {
    /// Run `cmd` in `cwd` and return its exit code.
    ///
    /// Fails with [`BuildError::ToolInvocation`] only when the tool cannot be
    /// started. A non-zero exit code is returned, not raised.
    fn invoke(&self, cmd: &CommandSpec, cwd: &Path) -> BuildResult<i32>;
}

/// Spawns real processes and forwards their output to `tracing`.
///
/// Standard output is logged at info level and standard error at error
/// level, line by line, as the tool runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl ToolInvoker for ProcessInvoker {
    fn invoke(&self, cmd: &CommandSpec, cwd: &Path) -> BuildResult<i32> {
        tracing::debug!("Running: {}", cmd.display());

        let mut process = ProcessBuilder::new(&cmd.program).args(&cmd.args).cwd(cwd);
        for (key, value) in &cmd.env {
            process = process.env(key, value);
        }

        let code = process
            .exec_streaming(|stream, line| match stream {
                OutputStream::Stdout => tracing::info!("{}", line),
                OutputStream::Stderr => tracing::error!("{}", line),
            })
            .map_err(|e| BuildError::ToolInvocation {
                program: cmd.program_name(),
                reason: format!("{:#}", e),
            })?;

        tracing::debug!("`{}` exited with {}", cmd.program_name(), code);
        Ok(code)
    }
}
