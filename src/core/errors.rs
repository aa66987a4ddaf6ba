//! Build failure taxonomy.
//!
//! Every variant aborts the build. Degraded outcomes (missing profile,
//! outdated profile, unsigned bundle) are log messages, not errors.

use miette::Diagnostic;
use thiserror::Error;

/// An error that stops a build.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    /// Bad or incompatible project configuration, detected before any tool runs.
    #[error("invalid project configuration: {message}")]
    #[diagnostic(code(aotpack::config::invalid))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The toolchain in use lacks a requested capability.
    #[error("{feature} is not supported by AOT toolchain {version}")]
    #[diagnostic(
        code(aotpack::toolchain::unsupported),
        help("Upgrade the AOT toolchain or point --jet-home at a newer installation")
    )]
    FeatureUnsupported { feature: String, version: String },

    /// An external tool could not be started.
    #[error("failed to run `{program}`: {reason}")]
    #[diagnostic(
        code(aotpack::tool::spawn),
        help("Check that the AOT toolchain is installed and JET_HOME is correct")
    )]
    ToolInvocation { program: String, reason: String },

    /// The compiler ran and exited non-zero.
    #[error("{message}")]
    #[diagnostic(
        code(aotpack::build::compile),
        help("Run `aotpack build --verbose` for more details")
    )]
    Compile { message: String },

    /// The packager (or a platform packaging tool) ran and exited non-zero.
    #[error("{message}")]
    #[diagnostic(code(aotpack::build::package))]
    Packaging { message: String },

    /// A filesystem operation failed.
    #[error("{0:#}")]
    #[diagnostic(code(aotpack::io))]
    Io(anyhow::Error),
}

impl BuildError {
    pub fn validation(message: impl Into<String>) -> Self {
        BuildError::Validation {
            message: message.into(),
            help: None,
        }
    }

    pub fn validation_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        BuildError::Validation {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        BuildError::Io(anyhow::anyhow!(message.into()))
    }
}

impl From<anyhow::Error> for BuildError {
    fn from(err: anyhow::Error) -> Self {
        BuildError::Io(err)
    }
}

/// Result alias for build operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;
