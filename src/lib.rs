//! Aotpack - build and package ahead-of-time compiled native images
//!
//! This crate provides the core library functionality for Aotpack:
//! project descriptors, toolchain detection, compiler and packager
//! argument generation, and the build orchestration that ties them together.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Aotpack unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted tool invoker and project fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{manifest::Manifest, project::Project, BuildError};

pub use util::context::GlobalContext;
