//! `aotpack build` command

use std::time::Instant;

use anyhow::Result;
use clap::ValueEnum;

use crate::cli::{BuildArgs, MessageFormat};
use aotpack::builder::events::{BuildEvent, JsonLog};
use aotpack::builder::ToolchainCapabilities;
use aotpack::ops::{build, load_project_and_toolchain, BuildOptions};
use aotpack::util::messages::TracingLog;
use aotpack::util::GlobalContext;

pub fn execute(args: BuildArgs, profiling: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let opts = BuildOptions {
        manifest_path: args.manifest_path,
        jet_home: args.jet_home,
    };
    let (mut project, toolchain) = load_project_and_toolchain(&ctx, &opts)?;

    // Message format: CLI > config > human
    let config = ctx.load_config(project.root());
    let format = match (args.message_format, config.build.message_format.as_deref()) {
        (Some(format), _) => format,
        (None, Some(configured)) => MessageFormat::from_str(configured, true)
            .map_err(|e| anyhow::anyhow!("invalid message-format in config: {}", e))?,
        (None, None) => MessageFormat::Human,
    };

    match format {
        MessageFormat::Human => {
            let outcome = build(&mut project, &toolchain, profiling, &TracingLog)?;
            eprintln!(
                "    Finished {} -> {}",
                outcome.artifact.kind,
                outcome.artifact.path.display()
            );
        }
        MessageFormat::Json => {
            let start = Instant::now();
            println!(
                "{}",
                BuildEvent::BuildStarted {
                    package: project.name().to_string(),
                    app_kind: project.app().as_str().to_string(),
                    packaging: project.packaging().as_str().to_string(),
                    profiling,
                    toolchain_version: toolchain.version().to_string(),
                }
                .to_json()
            );

            let result = build(&mut project, &toolchain, profiling, &JsonLog);
            let duration_ms = start.elapsed().as_millis() as u64;
            match result {
                Ok(outcome) => {
                    let artifact = &outcome.artifact;
                    println!(
                        "{}",
                        BuildEvent::artifact(artifact.kind.as_str(), &artifact.path).to_json()
                    );
                    println!("{}", BuildEvent::finished(true, duration_ms, None).to_json());
                }
                Err(e) => {
                    println!(
                        "{}",
                        BuildEvent::finished(false, duration_ms, Some(e.to_string())).to_json()
                    );
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}
