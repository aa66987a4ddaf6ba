//! Test utilities and mocks for aotpack unit tests.
//!
//! The main piece is [`MockInvoker`], a scripted [`ToolInvoker`] that records
//! every call and can simulate what the real tools leave on disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use aotpack::test_support::{CommandPattern, MockInvoker};
//!
//! let mut invoker = MockInvoker::new();
//! invoker.expect(CommandPattern::StartsWith("jc".into()), 1);
//! // Run a build with `&invoker` and inspect `invoker.calls()`.
//! ```

pub mod fixtures;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::builder::invoker::{CommandSpec, ToolInvoker};
use crate::core::errors::{BuildError, BuildResult};

pub use fixtures::*;

/// Pattern for matching commands in [`MockInvoker`].
///
/// Commands are matched as `"<program file name> <args...>"`.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
    /// Match using a regex pattern.
    Regex(String),
    /// Match any command.
    Any,
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
            CommandPattern::Regex(pattern) => regex::Regex::new(pattern)
                .map(|re| re.is_match(cmd))
                .unwrap_or(false),
            CommandPattern::Any => true,
        }
    }
}

/// Filesystem effect of a simulated tool run.
pub type SideEffect = Arc<dyn Fn(&CommandSpec, &Path) + Send + Sync>;

/// What a matched command does.
#[derive(Clone)]
pub struct InvokerExpectation {
    pub pattern: CommandPattern,
    /// Exit code to return
    pub exit_code: i32,
    /// Fail as if the program could not be started
    pub fails_to_start: bool,
    pub side_effect: Option<SideEffect>,
    /// Number of times this expectation can be used (None = unlimited).
    pub times: Option<usize>,
    used: usize,
}

impl InvokerExpectation {
    pub fn new(pattern: CommandPattern, exit_code: i32) -> Self {
        InvokerExpectation {
            pattern,
            exit_code,
            fails_to_start: false,
            side_effect: None,
            times: None,
            used: 0,
        }
    }

    /// Run `effect` whenever this expectation matches.
    pub fn with_side_effect(
        mut self,
        effect: impl Fn(&CommandSpec, &Path) + Send + Sync + 'static,
    ) -> Self {
        self.side_effect = Some(Arc::new(effect));
        self
    }

    /// Set the number of times this expectation can be used.
    pub fn times(mut self, n: usize) -> Self {
        self.times = Some(n);
        self
    }

    fn available(&self) -> bool {
        match self.times {
            Some(n) => self.used < n,
            None => true,
        }
    }
}

impl fmt::Debug for InvokerExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvokerExpectation")
            .field("pattern", &self.pattern)
            .field("exit_code", &self.exit_code)
            .field("fails_to_start", &self.fails_to_start)
            .field("times", &self.times)
            .field("used", &self.used)
            .finish()
    }
}

/// A command the mock was asked to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// File name of the program
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl RecordedCall {
    /// The call as matched by [`CommandPattern`].
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    expectations: Vec<InvokerExpectation>,
    calls: Vec<RecordedCall>,
}

/// Scripted tool invoker for testing builds without a toolchain.
///
/// Unmatched commands exit with the default code (0 unless changed).
#[derive(Debug)]
pub struct MockInvoker {
    state: Mutex<MockState>,
    default_exit: i32,
}

impl Default for MockInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInvoker {
    /// A mock where every command succeeds.
    pub fn new() -> Self {
        MockInvoker {
            state: Mutex::new(MockState::default()),
            default_exit: 0,
        }
    }

    /// Exit code for commands that match no expectation.
    pub fn set_default_exit(&mut self, code: i32) -> &mut Self {
        self.default_exit = code;
        self
    }

    /// Commands matching `pattern` exit with `exit_code`.
    pub fn expect(&mut self, pattern: CommandPattern, exit_code: i32) -> &mut Self {
        self.expect_pattern(InvokerExpectation::new(pattern, exit_code))
    }

    /// Commands matching `pattern` cannot be started.
    pub fn fail_to_start(&mut self, pattern: CommandPattern) -> &mut Self {
        let mut expectation = InvokerExpectation::new(pattern, -1);
        expectation.fails_to_start = true;
        self.expect_pattern(expectation)
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, expectation: InvokerExpectation) -> &mut Self {
        self.state_mut().expectations.push(expectation);
        self
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap_or_else(|e| e.into_inner())
    }

    /// All recorded calls, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    /// Recorded calls to the program with file name `program`.
    pub fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }

    /// Command lines of all recorded calls.
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::command_line).collect()
    }
}

impl ToolInvoker for MockInvoker {
    fn invoke(&self, cmd: &CommandSpec, cwd: &Path) -> BuildResult<i32> {
        let call = RecordedCall {
            program: cmd.program_name(),
            args: cmd.args.clone(),
            cwd: cwd.to_path_buf(),
        };
        let line = call.command_line();

        let matched = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.calls.push(call);
            state
                .expectations
                .iter_mut()
                .find(|e| e.pattern.matches(&line) && e.available())
                .map(|e| {
                    e.used += 1;
                    e.clone()
                })
        };

        let Some(expectation) = matched else {
            return Ok(self.default_exit);
        };
        if expectation.fails_to_start {
            return Err(BuildError::ToolInvocation {
                program: cmd.program_name(),
                reason: "No such file or directory (mock)".to_string(),
            });
        }
        if let Some(effect) = &expectation.side_effect {
            effect(cmd, cwd);
        }
        Ok(expectation.exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_pattern_matches() {
        assert!(CommandPattern::Exact("jc =p a.prj".into()).matches("jc =p a.prj"));
        assert!(CommandPattern::StartsWith("xpack".into()).matches("xpack -arg-file x"));
        assert!(CommandPattern::Contains("-zip".into()).matches("xpack -backend b -zip"));
        assert!(CommandPattern::Regex(r"^jc\s".into()).matches("jc =p a.prj"));
        assert!(CommandPattern::Any.matches("anything"));
    }

    #[test]
    fn test_mock_records_and_scripts_calls() {
        let mut invoker = MockInvoker::new();
        invoker.expect(CommandPattern::StartsWith("jc".into()), 3);
        let tmp = tempfile::TempDir::new().unwrap();

        let code = invoker
            .invoke(&CommandSpec::new("/opt/jet/bin/jc").arg("=p"), tmp.path())
            .unwrap();
        let other = invoker
            .invoke(&CommandSpec::new("/opt/jet/bin/xpack"), tmp.path())
            .unwrap();

        assert_eq!(code, 3);
        assert_eq!(other, 0);
        assert_eq!(invoker.command_lines(), vec!["jc =p", "xpack"]);
        assert_eq!(invoker.calls_to("jc").len(), 1);
    }

    #[test]
    fn test_times_limits_expectation() {
        let mut invoker = MockInvoker::new();
        invoker.expect_pattern(InvokerExpectation::new(CommandPattern::Any, 7).times(1));
        let tmp = tempfile::TempDir::new().unwrap();
        let cmd = CommandSpec::new("tool");

        assert_eq!(invoker.invoke(&cmd, tmp.path()).unwrap(), 7);
        assert_eq!(invoker.invoke(&cmd, tmp.path()).unwrap(), 0);
    }

    #[test]
    fn test_fail_to_start() {
        let mut invoker = MockInvoker::new();
        invoker.fail_to_start(CommandPattern::StartsWith("codesign".into()));
        let tmp = tempfile::TempDir::new().unwrap();

        let err = invoker
            .invoke(&CommandSpec::new("codesign"), tmp.path())
            .unwrap_err();
        assert!(matches!(err, BuildError::ToolInvocation { .. }));
    }
}
