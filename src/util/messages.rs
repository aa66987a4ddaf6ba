//! User-facing build messages.
//!
//! Every message the build emits is looked up by key in a [`Messages`]
//! catalog and delivered to a [`BuildLog`] sink. The catalog and the sink are
//! owned by a [`Reporter`] that is handed to the build explicitly, so two
//! builds never share logging state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Log severity of a build message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warning"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Destination for build messages.
pub trait BuildLog: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

/// Forwards build messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl BuildLog for TracingLog {
    fn log(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{}", message),
            Level::Warn => tracing::warn!("{}", message),
            Level::Error => tracing::error!("{}", message),
        }
    }
}

/// Keeps every message in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Recorded messages at the given level.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Whether any message at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at(level).iter().any(|m| m.contains(needle))
    }
}

impl BuildLog for MemoryLog {
    fn log(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}

const DEFAULT_MESSAGES: &[(&str, &str)] = &[
    ("build.success", "Build completed successfully"),
    ("build.failure", "Native compilation failed, see the compiler output above"),
    ("package.failure", "Packaging failed, see the packager output above"),
    ("build.get-dir", "The self-contained application directory is {0}"),
    ("build.get-zip", "The zip archive with the application is {0}"),
    ("build.get-archive", "The tar.gz archive with the application is {0}"),
    ("build.get-installer", "The native installer is {0}"),
    ("build.get-bundle", "The macOS application bundle is {0}"),
    ("build.get-pkg", "The macOS installer package is {0}"),
    ("build.zip-app", "Compressing the application directory into a zip archive"),
    ("build.archive-app", "Compressing the application directory into a tar.gz archive"),
    ("build.slim-down", "Copy the detached package {0} to the server at {1}"),
    ("build.compiling", "Compiling {0} with the AOT compiler"),
    ("build.packaging", "Packaging {0} into {1}"),
    ("service.scripts.failure", "Failed to create Windows service install scripts: {0}"),
    ("macos.signing", "Signing the macOS application bundle"),
    ("macos.creating-installer", "Creating the macOS installer package"),
    ("macos.codesign.failure", "Failed to sign the macOS application bundle"),
    ("macos.productbuild.failure", "Failed to create the macOS installer package"),
    ("macos.no-publisher-id", "No publisher identity is configured, so no macOS installer package was created"),
    ("macos.no-developer-id", "No developer identity is configured, so the macOS application bundle is unsigned"),
    ("io.unable-to-delete", "Unable to delete {0}"),
    ("io.unable-to-rename", "Unable to rename {0} to {1}"),
    ("profile.start", "Running {0} to collect an execution profile"),
    ("profile.nonzero-exit", "The profiling run exited with status {0}"),
    ("profile.collected", "The execution profile was collected to {0}"),
    ("profile.not-collected", "The execution profile {0} was not collected"),
    ("profile.windows-service", "Install and run the Windows service from {0} to collect its profile, then stop it"),
    ("profile.dynamic-library", "Load the library from {0} in a host application to collect its profile"),
    ("profile.not-locally", "The image to profile is {0}, packed into {1}. Run it on the target system, then copy {2} to {3}"),
    ("profile.outdated", "The execution profile {0} is {1} day(s) older than the application, consider collecting it again"),
    ("profile.outdated-pgo", "The PGO profile {0} is {1} day(s) older than the application, consider collecting it again"),
];

/// A catalog of message templates keyed by message id.
///
/// Templates use positional `{0}`, `{1}` placeholders.
#[derive(Debug, Clone)]
pub struct Messages {
    templates: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            templates: DEFAULT_MESSAGES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl Messages {
    /// An empty catalog.
    pub fn empty() -> Self {
        Messages {
            templates: HashMap::new(),
        }
    }

    /// Add or replace a template.
    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// Look up the template for `key`.
    pub fn template(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Format `key` with positional arguments. Returns `None` for unknown keys.
    pub fn format(&self, key: &str, args: &[&dyn fmt::Display]) -> Option<String> {
        let template = self.template(key)?;
        let mut out = template.to_string();
        for (i, arg) in args.iter().enumerate() {
            out = out.replace(&format!("{{{}}}", i), &arg.to_string());
        }
        Some(out)
    }
}

/// Formats catalog messages and writes them to a log sink.
pub struct Reporter<'a> {
    messages: Messages,
    log: &'a dyn BuildLog,
}

impl<'a> Reporter<'a> {
    pub fn new(messages: Messages, log: &'a dyn BuildLog) -> Self {
        Reporter { messages, log }
    }

    /// Resolve `key` to text. An unknown key is reported on the sink and the
    /// key itself is returned.
    pub fn text(&self, key: &str, args: &[&dyn fmt::Display]) -> String {
        match self.messages.format(key, args) {
            Some(text) => text,
            None => {
                self.log
                    .log(Level::Error, &format!("message catalog broken: key = {}", key));
                key.to_string()
            }
        }
    }

    pub fn info(&self, key: &str, args: &[&dyn fmt::Display]) {
        let text = self.text(key, args);
        self.log.log(Level::Info, &text);
    }

    pub fn warn(&self, key: &str, args: &[&dyn fmt::Display]) {
        let text = self.text(key, args);
        self.log.log(Level::Warn, &text);
    }

    pub fn error(&self, key: &str, args: &[&dyn fmt::Display]) {
        let text = self.text(key, args);
        self.log.log(Level::Error, &text);
    }
}

impl fmt::Debug for Reporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("messages", &self.messages.templates.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_positional() {
        let messages = Messages::empty().with("greet", "{0} built {1}, {0} again");
        let text = messages.format("greet", &[&"alice", &3]).unwrap();
        assert_eq!(text, "alice built 3, alice again");
    }

    #[test]
    fn test_default_catalog_has_build_keys() {
        let messages = Messages::default();
        assert!(messages.template("build.failure").is_some());
        assert!(messages.template("package.failure").is_some());
        assert!(messages.template("profile.not-locally").is_some());
    }

    #[test]
    fn test_unknown_key_is_reported_and_returned() {
        let log = MemoryLog::new();
        let reporter = Reporter::new(Messages::empty(), &log);

        reporter.info("no.such.key", &[]);

        assert!(log.contains(Level::Error, "message catalog broken: key = no.such.key"));
        assert_eq!(log.at(Level::Info), vec!["no.such.key".to_string()]);
    }

    #[test]
    fn test_levels_are_preserved() {
        let log = MemoryLog::new();
        let reporter = Reporter::new(Messages::default(), &log);

        reporter.warn("macos.no-developer-id", &[]);
        reporter.error("profile.not-collected", &[&"app.jprof"]);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, Level::Warn);
        assert_eq!(entries[1].0, Level::Error);
        assert!(entries[1].1.contains("app.jprof"));
    }
}
