//! Extension selection for the package mirror.
//!
//! This crate decides which extensions run and with which settings:
//! [`PluginConfig`] views, `--extension` option parsing and the layered
//! [`ExtensionSelection`] built from the configuration document and the
//! command line.

pub mod config;
pub mod error;
pub mod options;
pub mod selection;

/// Reserved top-level section of the configuration document.
///
/// It holds pipeline settings and is removed before the configuration is
/// handed to the repository generator.
pub const CONFIG_SECTION: &str = "s3-satis";

/// Dotted path of the per-extension settings inside the configuration document.
pub const PLUGINS_PATH: &str = "s3-satis.plugins";

pub use config::PluginConfig;
pub use error::{Error, Result};
pub use options::ExtensionOption;
pub use selection::ExtensionSelection;
