//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Aotpack - build and package native images with an AOT Java compiler
#[derive(Parser)]
#[command(name = "aotpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile the project and package the native image
    Build(BuildArgs),

    /// Build an instrumented image and collect execution profiles
    Profile(BuildArgs),

    /// Remove build output
    Clean(CleanArgs),

    /// Show the detected AOT toolchain
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Path to Aotpack.toml
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// AOT toolchain installation directory
    #[arg(long, env = "JET_HOME")]
    pub jet_home: Option<PathBuf>,

    /// Output format for build messages
    #[arg(long, value_enum)]
    pub message_format: Option<MessageFormat>,
}

/// Output format for build messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// Log lines on stderr
    Human,
    /// JSON build events on stdout, one per line
    Json,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to Aotpack.toml
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    /// Path to Aotpack.toml, for project configuration
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    /// AOT toolchain installation directory
    #[arg(long, env = "JET_HOME")]
    pub jet_home: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
