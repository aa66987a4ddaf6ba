//! Core data structures for Aotpack.
//!
//! This module contains the foundational types used throughout Aotpack:
//! - Application and packaging kinds
//! - The manifest and the project descriptor built from it
//! - Execution profiles
//! - The build error taxonomy

pub mod app;
pub mod errors;
pub mod manifest;
pub mod profiles;
pub mod project;

pub use app::{ApplicationKind, PackagingKind, TargetOs};
pub use errors::{BuildError, BuildResult};
pub use manifest::{Manifest, MANIFEST_NAME};
pub use profiles::{ProfileArtifacts, ProfileKind};
pub use project::Project;
