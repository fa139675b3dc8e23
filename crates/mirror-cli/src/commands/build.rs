//! The build command

use std::path::{Path, PathBuf};

use colored::Colorize;
use mirror_core::{
    BuildState, ExtensionRegistry, ExtensionRunner, Pipeline, RunEnvironment, SatisGenerator,
};
use mirror_fs::LocalStorage;

use crate::error::{CliError, Result};
use crate::prompt;

/// Options of one build run
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub config_file: PathBuf,
    pub repository_urls: Vec<String>,
    pub fresh: bool,
    pub extensions: Vec<String>,
    pub remote: Option<PathBuf>,
    pub staging_root: Option<PathBuf>,
    pub generator: String,
}

/// Default staging root: `package-mirror` in the system temp directory
pub fn default_staging_root() -> PathBuf {
    std::env::temp_dir().join("package-mirror")
}

/// Run the build command
pub fn run_build(options: BuildOptions) -> Result<()> {
    let config_file = absolute(&options.config_file)?;
    let mut state = BuildState::new(&config_file, options.repository_urls, options.fresh)?;

    let mut runner = ExtensionRunner::with_defaults(ExtensionRegistry::builtin());
    for error in runner.selection_mut().apply_document(state.config()) {
        tracing::error!("{error}");
    }
    for error in runner.selection_mut().apply_run_options(&options.extensions) {
        tracing::error!("{error}");
    }
    tracing::debug!(extensions = ?runner.selection().enabled(), "Resolved enabled extensions");

    let remote = options.remote.ok_or_else(|| {
        CliError::user("No remote store given. Pass --remote or set MIRROR_REMOTE_ROOT.")
    })?;
    let generator = SatisGenerator::from_command_line(&options.generator)
        .ok_or_else(|| CliError::user("The generator command is empty."))?;
    let staging_root = options.staging_root.unwrap_or_else(default_staging_root);

    tracing::debug!(
        remote = %remote.display(),
        staging = %staging_root.display(),
        prefix = state.temp_prefix(),
        "Starting build"
    );

    let env = RunEnvironment {
        staging: LocalStorage::new(staging_root),
        remote: Box::new(LocalStorage::new(remote)),
        generator: Box::new(generator),
        prompter: prompt::for_current_terminal(),
    };
    Pipeline::new(runner, env).run(&mut state)?;

    println!("{} Mirror build finished.", "OK".green().bold());
    Ok(())
}

/// The staging prefix hashes the configuration path, so it is resolved
/// against the working directory first.
fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
