//! Build event types for JSON output.
//!
//! These events are emitted when using `--message-format=json`, one JSON
//! object per line on stdout.
//!
//! # Event Types
//!
//! - `build-started`: The build began
//! - `diagnostic`: A build message (info, warning or error)
//! - `build-artifact`: The final artifact of the build
//! - `build-finished`: Build completed (success or failure)
//!
//! # Stability
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

use crate::util::messages::{BuildLog, Level};

/// A build event emitted during the build process.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// Build started event with metadata.
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Package name
        package: String,
        /// Application kind (e.g. "plain", "windows-service")
        app_kind: String,
        /// Packaging kind (e.g. "zip", "macos-app-bundle")
        packaging: String,
        /// Whether this run builds an instrumented image
        profiling: bool,
        /// AOT toolchain version
        toolchain_version: String,
    },

    /// A build message.
    #[serde(rename = "diagnostic")]
    Diagnostic {
        /// Severity level ("info", "warning", "error")
        level: String,
        /// Message text
        message: String,
    },

    /// The declared final artifact.
    #[serde(rename = "build-artifact")]
    Artifact {
        /// Artifact kind (e.g. "zip", "pkg")
        kind: String,
        path: PathBuf,
    },

    /// Build completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        /// Whether the build succeeded
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
        /// Error message, when the build failed
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl BuildEvent {
    /// Create a diagnostic event.
    pub fn diagnostic(level: Level, message: impl Into<String>) -> Self {
        BuildEvent::Diagnostic {
            level: level.to_string(),
            message: message.into(),
        }
    }

    /// Create an artifact event.
    pub fn artifact(kind: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        BuildEvent::Artifact {
            kind: kind.into(),
            path: path.into(),
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64, error: Option<String>) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
            error,
        }
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Prints build messages as `diagnostic` events on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLog;

impl BuildLog for JsonLog {
    fn log(&self, level: Level, message: &str) {
        println!("{}", BuildEvent::diagnostic(level, message).to_json());
    }
}
