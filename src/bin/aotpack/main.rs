//! Aotpack CLI - build and package native images with an AOT Java compiler

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use aotpack::BuildError;
use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        match e.downcast::<BuildError>() {
            Ok(build_error) => eprintln!("{:?}", miette::Report::new(build_error)),
            Err(e) => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("aotpack=debug")
    } else {
        EnvFilter::new("aotpack=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(args, false),
        Commands::Profile(args) => commands::profile::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Toolchain(args) => commands::toolchain::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
