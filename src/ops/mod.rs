//! High-level operations.
//!
//! This module contains the implementation of Aotpack commands.

pub mod build;
pub mod clean;
pub mod macos_bundle;
pub mod package;
pub mod profile;
pub mod windows_service;

pub use build::{
    build, load_project_and_toolchain, BuildOptions, BuildOrchestrator, BuildOutcome,
    BuildRequest,
};
pub use clean::clean;
pub use package::{native_zip_eligible, Artifact, ArtifactKind, NativeZipInputs};
pub use profile::{check_profiles_up_to_date, ProfileCycleController, ProfileOutcome};
