//! Error types for mirror-meta

/// Result type for mirror-meta operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-meta operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    #[error("Failed to parse JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize JSON: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid metadata document {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    #[error("Metadata transform failed: {0}")]
    Transform(String),
}

impl Error {
    pub fn invalid_document(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }
}
