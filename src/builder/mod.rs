//! AOT compiler and packager driving.
//!
//! This module turns a project into tool invocations: the compiler project
//! file, packager options, platform scripts and the invoker that runs them.

pub mod compiler_args;
pub mod context;
pub mod events;
pub mod invoker;
pub mod packager_args;
pub mod plist;
pub mod service_scripts;
pub mod toolchain;

pub use context::BuildContext;
pub use events::BuildEvent;
pub use invoker::{CommandSpec, ProcessInvoker, ToolInvoker};
pub use toolchain::{Toolchain, ToolchainCapabilities};
