//! Error types for release asset management.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for release asset operations.
#[derive(Error, Debug)]
pub enum AssetError {
    // Cli args errors
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "gh command-line tool is not installed: please install it to continue ({0})"
    )]
    GhNotInstalled(#[from] which::Error),

    // Release sequence errors
    #[error("Release '{tag}' not found")]
    ReleaseNotFound { tag: String },

    #[error("Failed to fetch release '{tag}': {reason}")]
    FetchError { tag: String, reason: String },

    #[error(
        "All releases are full: no space to upload '{file}' (release '{tag}' holds {count} assets)"
    )]
    ReleaseFull {
        file: String,
        tag: String,
        count: usize,
    },

    #[error("Failed to create release '{tag}': {reason}")]
    ReleaseCreationError { tag: String, reason: String },

    // Per-asset errors
    #[error("Failed to upload '{file}' to release '{tag}': {reason}")]
    UploadError {
        file: String,
        tag: String,
        reason: String,
    },

    #[error("Failed to download '{asset}' from release '{tag}': {reason}")]
    DownloadError {
        asset: String,
        tag: String,
        reason: String,
    },

    #[error("Failed to delete '{asset}' from release '{tag}': {reason}")]
    DeleteError {
        asset: String,
        tag: String,
        reason: String,
    },

    #[error("Cannot read local file '{}': {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("Command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // Parsing errors - automatic conversions via #[from]
    #[error("JSON parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("Git URL parse error: {0}")]
    GitUrlError(#[from] git_url_parse::GitUrlParseError),

    #[error("Glob pattern error: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] log::SetLoggerError),

    // Generic wrapper for other errors
    #[error(transparent)]
    Other(#[from] color_eyre::Report),
}

/// Result type alias using AssetError
pub type Result<T> = std::result::Result<T, AssetError>;

impl AssetError {
    /// Create an invalid arguments error
    pub fn invalid_args(msg: impl Into<String>) -> Self {
        Self::InvalidArgs(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    pub fn release_not_found(tag: impl Into<String>) -> Self {
        Self::ReleaseNotFound { tag: tag.into() }
    }

    pub fn fetch(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FetchError {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn release_creation(
        tag: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::ReleaseCreationError {
            tag: tag.into(),
            reason: reason.into(),
        }
    }

    pub fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        Self::UnreadableFile {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

// Implement From for std::io::Error - wraps in Other variant for generic I/O errors
impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(color_eyre::Report::from(err))
    }
}
