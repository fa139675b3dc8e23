//! Extension registration and hook dispatch
//!
//! - [`descriptor`]: what an extension is and which hooks it handles
//! - [`registry`]: the process-wide table of known extensions
//! - [`runner`]: per-run instantiation and dispatch
//! - [`context`]: what a handler gets to see

pub mod context;
pub mod descriptor;
pub mod registry;
pub mod runner;

pub use context::{HookContext, HookOutcome, RunEnvironment};
pub use descriptor::{DescriptorBuilder, ExtensionDescriptor, HandlerDescriptor};
pub use registry::ExtensionRegistry;
pub use runner::ExtensionRunner;
