//! `aotpack profile` command

use anyhow::Result;

use crate::cli::BuildArgs;

pub fn execute(args: BuildArgs) -> Result<()> {
    super::build::execute(args, true)
}
