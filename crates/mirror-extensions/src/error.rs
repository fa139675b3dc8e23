/// Errors that can occur while selecting and configuring extensions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Extension key not found in the registry.
    #[error("Extension {0} does not exist.")]
    UnknownExtension(String),

    /// A `--extension` option could not be parsed.
    #[error("invalid extension option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    /// A per-extension setting in the configuration document is malformed.
    #[error("Invalid configuration for plugin - {path} = {value} is not a boolean.")]
    InvalidSetting { path: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_option(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
