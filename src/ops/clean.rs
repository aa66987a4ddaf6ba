//! The `aotpack clean` operation.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::project::Project;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the project's output directory. Returns the removed path, or
/// `None` when there was nothing to remove.
pub fn clean(project: &Project) -> Result<Option<PathBuf>> {
    let output_dir = project.output_dir();
    if !output_dir.exists() {
        return Ok(None);
    }
    remove_dir_all_if_exists(&output_dir)?;
    tracing::debug!("Removed {}", output_dir.display());
    Ok(Some(output_dir))
}
