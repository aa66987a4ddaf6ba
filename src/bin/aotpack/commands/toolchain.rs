//! `aotpack toolchain` command

use anyhow::Result;

use crate::cli::ToolchainArgs;
use aotpack::builder::{Toolchain, ToolchainCapabilities};
use aotpack::util::{Config, GlobalContext};
use aotpack::Project;

pub fn execute(args: ToolchainArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    // Project configuration applies when a manifest is around
    let config = match ctx.manifest_path(args.manifest_path.as_deref()) {
        Ok(path) => ctx.load_config(Project::load(&path)?.root()),
        Err(_) if args.manifest_path.is_none() => Config::load_or_default(&ctx.config_path()),
        Err(e) => return Err(e),
    };

    let toolchain = Toolchain::detect(
        args.jet_home.as_deref(),
        &config.toolchain,
        &config.capabilities,
    )?;

    println!("Toolchain:");
    println!();
    println!("  Home:      {}", toolchain.home().display());
    println!("  Version:   {}", toolchain.version());
    println!("  Target OS: {}", toolchain.target_os());
    println!();
    println!("Capabilities:");
    println!("  native zip:                  {}", yes_no(toolchain.supports_native_zip()));
    println!(
        "  native zip with slim-down:   {}",
        yes_no(toolchain.native_zip_with_runtime_reduction())
    );
    println!("  response files:              {}", yes_no(toolchain.supports_response_files()));
    println!("  profile-guided optimization: {}", yes_no(toolchain.supports_pgo()));

    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
