//! Command implementations for mirror-cli

pub mod build;
pub mod list;

pub use build::{BuildOptions, run_build};
pub use list::run_list_extensions;
