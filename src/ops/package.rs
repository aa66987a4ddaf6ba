//! Packaging the compiled image.
//!
//! The self-contained directory is always produced first. A production build
//! then turns it into exactly one final artifact according to the packaging
//! kind.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::builder::context::BuildContext;
use crate::builder::toolchain::ToolchainCapabilities;
use crate::core::app::{ApplicationKind, PackagingKind};
use crate::core::errors::{BuildError, BuildResult};
use crate::core::project::Project;
use crate::ops::build::BuildRequest;
use crate::ops::{macos_bundle, windows_service};
use crate::util::fs::{compress_to_tar_gz, compress_to_zip};

/// What kind of file or directory the build produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Directory,
    Zip,
    TarGz,
    Installer,
    AppBundle,
    InstallerPackage,
    ProfilingImage,
    ProfilingArchive,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Directory => "directory",
            ArtifactKind::Zip => "zip",
            ArtifactKind::TarGz => "tar-gz",
            ArtifactKind::Installer => "installer",
            ArtifactKind::AppBundle => "app-bundle",
            ArtifactKind::InstallerPackage => "pkg",
            ArtifactKind::ProfilingImage => "profiling-image",
            ArtifactKind::ProfilingArchive => "profiling-archive",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared final artifact of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
}

impl Artifact {
    pub fn new(kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        Artifact {
            kind,
            path: path.into(),
        }
    }
}

/// Everything the native zip decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeZipInputs {
    pub packaging: PackagingKind,
    pub profiling: bool,
    pub profile_locally: bool,
    pub supports_native_zip: bool,
    /// Native zipping works together with runtime reduction
    pub runtime_reduction_fixed: bool,
    pub windows_service: bool,
    pub slim_down: bool,
    pub disk_footprint_reduction: bool,
}

impl NativeZipInputs {
    pub fn new(
        request: &BuildRequest,
        project: &Project,
        capabilities: &dyn ToolchainCapabilities,
    ) -> Self {
        NativeZipInputs {
            packaging: request.packaging,
            profiling: request.is_profiling_run,
            profile_locally: project.profile_locally(),
            supports_native_zip: capabilities.supports_native_zip(),
            runtime_reduction_fixed: capabilities.native_zip_with_runtime_reduction(),
            windows_service: request.app_kind.is_windows_service(),
            slim_down: project.runtime().slim_down.is_some(),
            disk_footprint_reduction: project.runtime().disk_footprint_reduction.is_some(),
        }
    }
}

/// Whether the packager should compress the self-contained directory itself.
///
/// Applies to production zip builds and to remote profiling runs (whose
/// image is shipped as an archive). Toolchains before the runtime-reduction
/// fix cannot zip natively while slim-down or disk footprint reduction is on.
pub fn native_zip_eligible(inputs: &NativeZipInputs) -> bool {
    let wants_archive = if inputs.profiling {
        !inputs.profile_locally
    } else {
        inputs.packaging == PackagingKind::Zip
    };
    let runtime_reduction_ok =
        inputs.runtime_reduction_fixed || (!inputs.slim_down && !inputs.disk_footprint_reduction);

    wants_archive && inputs.supports_native_zip && !inputs.windows_service && runtime_reduction_ok
}

/// Package the compiled image into the self-contained directory `target_dir`.
///
/// When native zipping applies the packager also writes `<target_dir>.zip`.
/// Windows services get their install scripts here.
pub fn create_self_contained_dir(
    ctx: &BuildContext<'_>,
    request: &BuildRequest,
    target_dir: &Path,
) -> BuildResult<()> {
    let generator = ctx.packager_args();
    let set = generator.option_set(generator.common_options(target_dir), ".SFD");

    let trailing: &[&str] =
        if native_zip_eligible(&NativeZipInputs::new(request, ctx.project, ctx.toolchain)) {
            &["-backend", "self-contained-directory", "-zip"]
        } else {
            &[]
        };
    ctx.pack(set, trailing)?;

    if let ApplicationKind::WindowsService(service) = &request.app_kind {
        windows_service::create_install_scripts(ctx, service, target_dir).map_err(|e| {
            BuildError::io(
                ctx.reporter
                    .text("service.scripts.failure", &[&format!("{:#}", e)]),
            )
        })?;
    }
    Ok(())
}

/// Turn the self-contained directory `package_dir` into the final artifact.
pub fn package(
    ctx: &BuildContext<'_>,
    request: &BuildRequest,
    package_dir: &Path,
) -> BuildResult<Artifact> {
    let reporter = ctx.reporter;
    let project = ctx.project;

    let artifact = match request.packaging {
        PackagingKind::Directory => {
            reporter.info("build.success", &[]);
            reporter.info("build.get-dir", &[&package_dir.display()]);
            Artifact::new(ArtifactKind::Directory, package_dir)
        }
        PackagingKind::Zip => {
            let target = zip_build(ctx, request, package_dir)?;
            reporter.info("build.success", &[]);
            reporter.info("build.get-zip", &[&target.display()]);
            Artifact::new(ArtifactKind::Zip, target)
        }
        PackagingKind::TarGz => {
            reporter.info("build.archive-app", &[]);
            let target = project
                .output_dir()
                .join(format!("{}.tar.gz", project.artifact_name()));
            compress_to_tar_gz(package_dir, &target)?;
            reporter.info("build.success", &[]);
            reporter.info("build.get-archive", &[&target.display()]);
            Artifact::new(ArtifactKind::TarGz, target)
        }
        PackagingKind::NativeInstaller => pack_installer(ctx)?,
        PackagingKind::MacosAppBundle => macos_bundle::create_app_bundle(ctx)?,
    };

    if let Some(slim_down) = &project.runtime().slim_down {
        reporter.info(
            "build.slim-down",
            &[
                &project.output_dir().join(&slim_down.detached_package).display(),
                &slim_down.detached_base_url,
            ],
        );
    }

    Ok(artifact)
}

/// Produce the zip archive of `package_dir`.
///
/// Production builds write `<output>/<artifact-name>.zip`; profiling runs
/// write `<profiling-image-dir>.zip`. With native zipping the packager has
/// already written `<package_dir>.zip`, which is moved into place.
pub fn zip_build(
    ctx: &BuildContext<'_>,
    request: &BuildRequest,
    package_dir: &Path,
) -> BuildResult<PathBuf> {
    let project = ctx.project;
    let target = if request.is_profiling_run {
        sibling_zip(&project.profiling_image_dir())
    } else {
        project
            .output_dir()
            .join(format!("{}.zip", project.artifact_name()))
    };

    if native_zip_eligible(&NativeZipInputs::new(request, project, ctx.toolchain)) {
        let produced = sibling_zip(package_dir);
        if produced != target {
            move_into_place(ctx, &produced, &target)?;
        }
    } else {
        ctx.reporter.info("build.zip-app", &[]);
        compress_to_zip(package_dir, &target)?;
    }
    Ok(target)
}

/// Replace `target` with `produced`.
fn move_into_place(ctx: &BuildContext<'_>, produced: &Path, target: &Path) -> BuildResult<()> {
    if target.exists() && std::fs::remove_file(target).is_err() && target.exists() {
        return Err(BuildError::io(
            ctx.reporter
                .text("io.unable-to-delete", &[&target.display()]),
        ));
    }
    if std::fs::rename(produced, target).is_err() && !target.exists() {
        return Err(BuildError::io(ctx.reporter.text(
            "io.unable-to-rename",
            &[&produced.display(), &target.display()],
        )));
    }
    Ok(())
}

/// `<dir>.zip`, next to `dir`.
fn sibling_zip(dir: &Path) -> PathBuf {
    let mut name = dir.as_os_str().to_owned();
    name.push(".zip");
    PathBuf::from(name)
}

/// Package the compiled image directly into a native installer.
fn pack_installer(ctx: &BuildContext<'_>) -> BuildResult<Artifact> {
    let project = ctx.project;
    let target = project
        .output_dir()
        .join(ctx.toolchain.target_os().exe_name(project.artifact_name()));

    let generator = ctx.packager_args();
    let set = generator.option_set(generator.installer_options(&target), ".EI");
    ctx.pack(set, &[])?;

    ctx.reporter.info("build.success", &[]);
    ctx.reporter
        .info("build.get-installer", &[&target.display()]);
    Ok(Artifact::new(ArtifactKind::Installer, target))
}
