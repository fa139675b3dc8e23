//! External repository generator
//!
//! The generator turns a configuration file into a static package
//! repository in an output directory. [`SatisGenerator`] runs a Satis
//! compatible command line as a subprocess.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Builds and purges a static package repository
pub trait RepositoryGenerator {
    /// Build the repository described by `config` into `output_dir`,
    /// optionally restricted to `repository_urls`
    fn build(&self, config: &Path, output_dir: &Path, repository_urls: &[String]) -> Result<()>;

    /// Remove archives no longer referenced by the repository in `output_dir`
    fn purge(&self, config: &Path, output_dir: &Path) -> Result<()>;
}

/// Runs `<program> [args…] build|purge <config> <output-dir> …` as a subprocess
#[derive(Debug, Clone)]
pub struct SatisGenerator {
    program: PathBuf,
    args: Vec<String>,
}

impl SatisGenerator {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parse a command line such as `php vendor/bin/satis` into a generator
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace();
        let program = parts.next()?;
        Some(Self {
            program: PathBuf::from(program),
            args: parts.map(str::to_string).collect(),
        })
    }

    /// Leading arguments passed before the operation name
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn run(&self, operation: &str, operands: &[&std::ffi::OsStr]) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(operation).args(operands);

        tracing::debug!(program = %self.program.display(), operation, "Running generator");

        let output = cmd.output().map_err(|source| Error::GeneratorSpawn {
            program: self.program.display().to_string(),
            source,
        })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            tracing::debug!(target: "mirror::generator", "{line}");
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(Error::GeneratorFailed {
                operation: operation.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl RepositoryGenerator for SatisGenerator {
    fn build(&self, config: &Path, output_dir: &Path, repository_urls: &[String]) -> Result<()> {
        let mut operands = vec![config.as_os_str(), output_dir.as_os_str()];
        for url in repository_urls {
            operands.push("--repository-url".as_ref());
            operands.push(url.as_ref());
        }
        self.run("build", &operands)
    }

    fn purge(&self, config: &Path, output_dir: &Path) -> Result<()> {
        self.run("purge", &[config.as_os_str(), output_dir.as_os_str()])
    }
}
