//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Config file {path} does not exist")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file is not a JSON object
    #[error("Invalid config file {path}: {reason}")]
    ConfigParse { path: PathBuf, reason: String },

    /// The repository generator could not be started
    #[error("Failed to run generator '{program}': {source}")]
    GeneratorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The repository generator exited unsuccessfully
    #[error("Generator {operation} failed (exit code {code:?}): {stderr}")]
    GeneratorFailed {
        operation: String,
        code: Option<i32>,
        stderr: String,
    },

    /// An extension handler failed
    #[error("Extension {extension} failed: {message}")]
    Extension { extension: String, message: String },

    /// Interactive confirmation failed
    #[error("Prompt failed: {0}")]
    Prompt(String),

    /// I/O error outside a storage
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Storage error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Metadata error from mirror-meta
    #[error(transparent)]
    Meta(#[from] mirror_meta::Error),

    /// Selection error from mirror-extensions
    #[error(transparent)]
    Extensions(#[from] mirror_extensions::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn extension(extension: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extension {
            extension: extension.into(),
            message: message.into(),
        }
    }
}
