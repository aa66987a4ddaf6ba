//! The `aotpack build` operation.
//!
//! A build runs as a fixed sequence of steps, each of which aborts the run
//! on failure:
//!
//! 1. Check that the toolchain can do what the run needs
//! 2. Validate the project against the toolchain target
//! 3. Prepare the build directory and clear the output directory
//! 4. Stage the inputs and run the AOT compiler
//! 5. Package the compiled image into a self-contained directory
//! 6. Collect profiles (profiling runs) or produce the final artifact
//!    and check profile freshness (production runs)

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;

use crate::builder::compiler_args::CompilerArgsGenerator;
use crate::builder::context::BuildContext;
use crate::builder::invoker::{ProcessInvoker, ToolInvoker};
use crate::builder::toolchain::{Toolchain, ToolchainCapabilities};
use crate::core::app::{ApplicationKind, PackagingKind};
use crate::core::errors::{BuildError, BuildResult};
use crate::core::project::Project;
use crate::ops::package::{self, Artifact};
use crate::ops::profile::{
    check_profiles_up_to_date, ProfileCycleController, ProfileOutcome, StaleProfile,
};
use crate::util::context::GlobalContext;
use crate::util::fs::{clean_directory, ensure_dir, write_string};
use crate::util::messages::{BuildLog, Messages, Reporter};

/// Where to find the project and the toolchain.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit manifest, otherwise searched upward from the working directory
    pub manifest_path: Option<PathBuf>,
    /// Toolchain installation, overriding the configured one
    pub jet_home: Option<PathBuf>,
}

/// Build `project` with the real tools, reporting to `log`.
pub fn build(
    project: &mut Project,
    toolchain: &Toolchain,
    profiling: bool,
    log: &dyn BuildLog,
) -> BuildResult<BuildOutcome> {
    let reporter = Reporter::new(Messages::default(), log);
    let request = BuildRequest::from_project(project, profiling);
    BuildOrchestrator::new(project, toolchain, &ProcessInvoker, &reporter).execute(&request)
}

/// Load the project at the resolved manifest path and detect its toolchain.
pub fn load_project_and_toolchain(
    gctx: &GlobalContext,
    opts: &BuildOptions,
) -> Result<(Project, Toolchain)> {
    let manifest_path = gctx.manifest_path(opts.manifest_path.as_deref())?;
    let project = Project::load(&manifest_path)?;

    let config = gctx.load_config(project.root());
    let toolchain = Toolchain::detect(
        opts.jet_home.as_deref(),
        &config.toolchain,
        &config.capabilities,
    )?;
    Ok((project, toolchain))
}

/// What one invocation builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub app_kind: ApplicationKind,
    pub packaging: PackagingKind,
    pub is_profiling_run: bool,
    /// Directory the compiler and packager run in
    pub working_dir: PathBuf,
}

impl BuildRequest {
    pub fn from_project(project: &Project, profiling: bool) -> Self {
        BuildRequest {
            app_kind: project.app().clone(),
            packaging: project.packaging(),
            is_profiling_run: profiling,
            working_dir: project.build_dir(),
        }
    }
}

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub artifact: Artifact,
    /// Set for profiling runs
    pub profile: Option<ProfileOutcome>,
    pub stale_profiles: Vec<StaleProfile>,
}

/// Runs builds of one project with one toolchain.
pub struct BuildOrchestrator<'a> {
    project: &'a mut Project,
    toolchain: &'a Toolchain,
    invoker: &'a dyn ToolInvoker,
    reporter: &'a Reporter<'a>,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(
        project: &'a mut Project,
        toolchain: &'a Toolchain,
        invoker: &'a dyn ToolInvoker,
        reporter: &'a Reporter<'a>,
    ) -> Self {
        BuildOrchestrator {
            project,
            toolchain,
            invoker,
            reporter,
        }
    }

    pub fn project(&self) -> &Project {
        self.project
    }

    /// Run every build step for `request`.
    pub fn execute(&mut self, request: &BuildRequest) -> BuildResult<BuildOutcome> {
        let start = Instant::now();
        let profiling = request.is_profiling_run;

        if profiling && !self.toolchain.supports_pgo() {
            return Err(BuildError::FeatureUnsupported {
                feature: "profile-guided optimization".to_string(),
                version: self.toolchain.version().to_string(),
            });
        }

        self.project.validate(self.toolchain.target_os(), profiling)?;

        let build_dir = &request.working_dir;
        ensure_dir(build_dir)?;

        let image_dir = if profiling {
            self.project.profiling_image_dir()
        } else {
            self.project.app_dir()
        };
        clean_directory(&image_dir)?;

        self.compile(request)?;

        let ctx = BuildContext::new(self.project, self.toolchain, self.invoker, self.reporter);
        self.reporter.info(
            "build.packaging",
            &[&self.project.name(), &image_dir.display()],
        );
        package::create_self_contained_dir(&ctx, request, &image_dir)?;

        let outcome = if profiling {
            let (profile, artifact) = ProfileCycleController::new(ctx).run(request, &image_dir)?;
            if let ProfileOutcome::Collected { at } = profile {
                self.project.profiles_mut().mark_collected(at);
            }
            BuildOutcome {
                artifact,
                profile: Some(profile),
                stale_profiles: Vec::new(),
            }
        } else {
            let artifact = package::package(&ctx, request, &image_dir)?;
            BuildOutcome {
                artifact,
                profile: None,
                stale_profiles: check_profiles_up_to_date(self.project, self.reporter),
            }
        };

        tracing::debug!(
            "Build of `{}` finished in {:.2}s",
            self.project.name(),
            start.elapsed().as_secs_f64()
        );
        Ok(outcome)
    }

    /// Stage the inputs, write the compiler project file and run the compiler.
    fn compile(&self, request: &BuildRequest) -> BuildResult<()> {
        let build_dir = &request.working_dir;
        let staged = self.project.stage_inputs(build_dir)?;

        let generator =
            CompilerArgsGenerator::new(self.project, self.toolchain, request.is_profiling_run);
        write_string(
            &build_dir.join(generator.project_file_name()),
            &generator.project_file_content(&staged),
        )?;

        self.reporter.info("build.compiling", &[&self.project.name()]);
        let cmd = generator.compile_command(self.toolchain);
        let code = self.invoker.invoke(&cmd, build_dir)?;
        if code != 0 {
            return Err(BuildError::Compile {
                message: self.reporter.text("build.failure", &[]),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for BuildOrchestrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildOrchestrator")
            .field("project", &self.project.name())
            .field("toolchain", &self.toolchain)
            .finish()
    }
}
