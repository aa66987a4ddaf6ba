//! Shared utilities

pub mod config;
pub mod context;
pub mod fs;
pub mod messages;
pub mod process;

pub use config::Config;
pub use context::GlobalContext;
pub use messages::{Messages, Reporter};
