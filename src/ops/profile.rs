//! Profile collection and profile freshness.
//!
//! A profiling run builds an instrumented image. When profiling locally the
//! image is run right away to collect the JIT profile; otherwise it is packed
//! into an archive for the user to run on the target system.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::builder::context::BuildContext;
use crate::builder::invoker::CommandSpec;
use crate::core::app::ApplicationKind;
use crate::core::errors::BuildResult;
use crate::core::profiles::{age_in_days, is_stale, ProfileKind};
use crate::core::project::Project;
use crate::ops::build::BuildRequest;
use crate::ops::package::{self, Artifact, ArtifactKind};
use crate::util::fs::ensure_dir;
use crate::util::messages::Reporter;

/// How a profiling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    /// The instrumented image ran locally and wrote the JIT profile.
    Collected { at: SystemTime },
    /// The instrumented image ran locally but no profile appeared.
    NotCollected,
    /// The image cannot be run directly; the user collects the profile.
    Manual,
    /// The image was packed for a profiling run on another system.
    Remote { archive: PathBuf },
}

/// Drives the post-compile half of a profiling run.
#[derive(Debug, Clone, Copy)]
pub struct ProfileCycleController<'a> {
    ctx: BuildContext<'a>,
}

impl<'a> ProfileCycleController<'a> {
    pub fn new(ctx: BuildContext<'a>) -> Self {
        ProfileCycleController { ctx }
    }

    /// Collect or hand off the profile of the instrumented image in
    /// `image_dir`.
    pub fn run(
        &self,
        request: &BuildRequest,
        image_dir: &Path,
    ) -> BuildResult<(ProfileOutcome, Artifact)> {
        let project = self.ctx.project;
        ensure_dir(&project.profiles_dir())?;

        if project.profile_locally() {
            let outcome = self.profile_locally(request, image_dir)?;
            Ok((outcome, Artifact::new(ArtifactKind::ProfilingImage, image_dir)))
        } else {
            let archive = self.prepare_remote(request, image_dir)?;
            Ok((
                ProfileOutcome::Remote {
                    archive: archive.clone(),
                },
                Artifact::new(ArtifactKind::ProfilingArchive, archive),
            ))
        }
    }

    fn profile_locally(
        &self,
        request: &BuildRequest,
        image_dir: &Path,
    ) -> BuildResult<ProfileOutcome> {
        let reporter = self.ctx.reporter;
        match &request.app_kind {
            ApplicationKind::WindowsService(_) => {
                reporter.info("profile.windows-service", &[&image_dir.display()]);
                return Ok(ProfileOutcome::Manual);
            }
            ApplicationKind::DynamicLibrary(_) => {
                reporter.info("profile.dynamic-library", &[&image_dir.display()]);
                return Ok(ProfileOutcome::Manual);
            }
            _ => {}
        }

        let project = self.ctx.project;
        let image = image_dir.join(project.executable_path(self.ctx.toolchain.target_os()));
        let cmd = CommandSpec::new(&image).args(project.profiling_run_args().iter().cloned());

        reporter.info("profile.start", &[&image.display()]);
        let code = self.ctx.invoker.invoke(&cmd, image_dir)?;
        if code != 0 {
            reporter.warn("profile.nonzero-exit", &[&code]);
        }

        let jit = &project.profiles().jit;
        if jit.exists() {
            reporter.info("profile.collected", &[&jit.display()]);
            Ok(ProfileOutcome::Collected {
                at: SystemTime::now(),
            })
        } else {
            reporter.error("profile.not-collected", &[&jit.display()]);
            Ok(ProfileOutcome::NotCollected)
        }
    }

    fn prepare_remote(&self, request: &BuildRequest, image_dir: &Path) -> BuildResult<PathBuf> {
        let project = self.ctx.project;
        let archive = package::zip_build(&self.ctx, request, image_dir)?;

        let jit_name = project
            .profiles()
            .jit
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.ctx.reporter.info(
            "profile.not-locally",
            &[
                &image_dir.display(),
                &archive.display(),
                &jit_name,
                &project.profiles_dir().display(),
            ],
        );
        Ok(archive)
    }
}

/// A profile older than the main artifact by at least the warning threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleProfile {
    pub kind: ProfileKind,
    pub path: PathBuf,
    pub age_days: i64,
}

/// Warn about profiles that are older than the project's main artifact by
/// at least `days-to-warn-about-outdated-profiles`.
///
/// Never fails: missing files or timestamps just skip the check.
pub fn check_profiles_up_to_date(project: &Project, reporter: &Reporter<'_>) -> Vec<StaleProfile> {
    let threshold = project.days_to_warn_about_outdated_profiles();
    if threshold <= 0 {
        return Vec::new();
    }
    let Some(artifact_time) = project.main_artifact().as_deref().and_then(modified) else {
        tracing::debug!("No main artifact to compare profiles against");
        return Vec::new();
    };

    let mut stale = Vec::new();
    for (kind, path) in project.profiles().all() {
        let Some(profile_time) = modified(path) else {
            continue;
        };
        let age_days = age_in_days(profile_time, artifact_time);
        if !is_stale(age_days, threshold) {
            continue;
        }

        let key = match kind {
            ProfileKind::Jit => "profile.outdated-pgo",
            ProfileKind::Startup | ProfileKind::Usage => "profile.outdated",
        };
        reporter.warn(key, &[&path.display(), &age_days]);
        stale.push(StaleProfile {
            kind,
            path: path.to_path_buf(),
            age_days,
        });
    }
    stale
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
