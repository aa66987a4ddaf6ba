//! `aotpack clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use aotpack::ops::clean;
use aotpack::util::GlobalContext;
use aotpack::Project;

pub fn execute(args: CleanArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    let manifest_path = ctx.manifest_path(args.manifest_path.as_deref())?;
    let project = Project::load(&manifest_path)?;

    if let Some(removed) = clean(&project)? {
        eprintln!("     Removed {}", removed.display());
    }

    Ok(())
}
