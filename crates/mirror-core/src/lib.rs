//! Build pipeline for the package mirror
//!
//! This crate regenerates a static package repository and synchronizes it
//! with a remote store, implementing:
//!
//! - **Build state**: per-run state threaded through every stage and hook
//! - **Extensions**: a registry of extensions bound to hook points, and the
//!   dispatcher that runs them
//! - **Pipeline**: seven fixed stages, each bracketed by `BEFORE_*` and
//!   `AFTER_*` hook points that may veto the stage
//! - **Built-in extensions**: caching, checksum fixing, metadata rewriting
//!   and run control
//!
//! # Architecture
//!
//! ```text
//!                   mirror-cli
//!                       |
//!                  mirror-core
//!                       |
//!     +-----------------+------------------+
//!     |                 |                  |
//! mirror-fs        mirror-meta      mirror-extensions
//! ```
//!
//! # Example
//!
//! ```ignore
//! use mirror_core::{BuildState, ExtensionRegistry, ExtensionRunner, Pipeline};
//!
//! let mut state = BuildState::new("satis.json", vec![], false)?;
//! let runner = ExtensionRunner::with_defaults(ExtensionRegistry::builtin());
//! Pipeline::new(runner, env).run(&mut state)?;
//! ```

pub mod builtin;
pub mod error;
pub mod extensions;
pub mod generator;
pub mod hooks;
pub mod pipeline;
pub mod prompt;
pub mod state;

pub use error::{Error, Result};
pub use extensions::{
    ExtensionDescriptor, ExtensionRegistry, ExtensionRunner, HookContext, HookOutcome,
    RunEnvironment,
};
pub use generator::{RepositoryGenerator, SatisGenerator};
pub use hooks::{HookPoint, Stage};
pub use pipeline::Pipeline;
pub use prompt::{AutoContinue, Prompter};
pub use state::BuildState;
