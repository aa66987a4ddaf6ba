//! Windows service install support in the self-contained directory.

use std::path::Path;

use anyhow::Result;

use crate::builder::context::BuildContext;
use crate::builder::service_scripts::{ServiceScripts, SCRIPT_LINE_ENDING};
use crate::builder::toolchain::SERVICE_HELPER;
use crate::core::app::WindowsService;
use crate::util::fs::{copy_file, write_lines};

/// Copy the service control helper into `app_dir` and write the response
/// file plus `install.bat` and `uninstall.bat` next to it.
pub fn create_install_scripts(
    ctx: &BuildContext<'_>,
    service: &WindowsService,
    app_dir: &Path,
) -> Result<()> {
    copy_file(&ctx.toolchain.service_helper(), &app_dir.join(SERVICE_HELPER))?;

    let exe_name = ctx.project.image_name(ctx.toolchain.target_os());
    let scripts = ServiceScripts::new(service, exe_name);
    let rsp = format!("{}.rsp", ctx.project.output_name());

    write_lines(&app_dir.join(&rsp), &scripts.isrv_args(), SCRIPT_LINE_ENDING)?;
    write_lines(
        &app_dir.join("install.bat"),
        &scripts.install_bat(&rsp),
        SCRIPT_LINE_ENDING,
    )?;
    write_lines(
        &app_dir.join("uninstall.bat"),
        &scripts.uninstall_bat(),
        SCRIPT_LINE_ENDING,
    )?;

    tracing::debug!("Wrote service scripts for `{}`", service.name);
    Ok(())
}
