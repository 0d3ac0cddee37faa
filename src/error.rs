//! Centralized error types for filemailer.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the filemailer library.
#[derive(Error, Debug)]
pub enum FileMailerError {
    /// No directory for captured mail was configured.
    #[error("Directory for captured mail is not defined")]
    Configuration,

    /// The mail directory is not a directory or could not be created.
    #[error("Directory '{0}' is not a directory or cannot be created")]
    Directory(PathBuf),

    /// The mail directory exists but is not writable.
    #[error("Directory '{0}' is not writable")]
    Permission(PathBuf),

    /// Writing a captured message failed or wrote nothing.
    #[error("Unable to write email to '{path}': {reason}")]
    Write { path: PathBuf, reason: String },

    /// The message is too broken to be parsed.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// A stored message or attachment vanished or never existed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O error with the associated path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A relative time such as `"-2 seconds"` could not be understood.
    #[error("Invalid relative time '{0}'")]
    InvalidRelativeTime(String),
}

/// Convenience alias for `Result<T, FileMailerError>`.
pub type Result<T> = std::result::Result<T, FileMailerError>;

impl FileMailerError {
    /// Create an `Io` variant from a path and an `io::Error`.
    ///
    /// A `NotFound` I/O error becomes [`FileMailerError::NotFound`] so that
    /// callers racing a delete can tell it apart from real failures.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.display().to_string());
        }
        Self::Io { path, source }
    }

    /// `true` for errors an inspection listing skips instead of failing on.
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MalformedMessage(_))
    }
}
