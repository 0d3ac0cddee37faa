//! Capture side of the store: writes each outgoing message to its own file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, info};

use crate::error::{FileMailerError, Result};
use crate::parser;

/// Writes captured messages to a flat directory instead of sending them.
///
/// Files are named `<prefix><identifier>`: the prefix is the construction
/// time formatted `YYYYMMDDhhmmss-` and stays the same for the lifetime of
/// the store; the identifier is the leading word run of the `Message-ID`
/// local part. Two captures sharing prefix and identifier overwrite each
/// other (last writer wins).
#[derive(Debug, Clone)]
pub struct MessageStore {
    dir: Option<PathBuf>,
    prefix: String,
}

impl MessageStore {
    /// Create a store writing to `dir`. The directory is checked on every send.
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            prefix: format!("{}-", Local::now().format("%Y%m%d%H%M%S")),
        }
    }

    /// The filename prefix shared by every message captured by this store.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The configured directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Verify that the directory is configured, exists (creating it if
    /// needed, non-recursively) and is writable.
    pub fn check_requirements(&self) -> Result<&Path> {
        let dir = self.dir.as_deref().ok_or(FileMailerError::Configuration)?;

        if !dir.is_dir() {
            if let Err(e) = fs::create_dir(dir) {
                debug!(dir = %dir.display(), error = %e, "Could not create mail directory");
            }
            if !dir.is_dir() {
                return Err(FileMailerError::Directory(dir.to_path_buf()));
            }
            info!(dir = %dir.display(), "Created mail directory");
        }

        // Effective access, not mode bits: a scratch file must be creatable
        match tempfile::NamedTempFile::new_in(dir) {
            Ok(scratch) => drop(scratch),
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                debug!(dir = %dir.display(), error = %e, "Mail directory is not writable");
                return Err(FileMailerError::Permission(dir.to_path_buf()));
            }
            Err(e) => return Err(FileMailerError::io(dir, e)),
        }

        Ok(dir)
    }

    /// Store a raw message and return the number of bytes written.
    ///
    /// The identifier is extracted before anything touches the disk, so a
    /// message without `Message-ID` leaves no file behind.
    pub fn send(&self, raw: &[u8]) -> Result<usize> {
        self.check_requirements()?;
        let id = parser::extract_message_id(raw)?;
        let path = self.path_for(&id)?;

        let written = write_message(&path, raw)?;
        info!(path = %path.display(), bytes = written, "Captured message");
        Ok(written)
    }

    /// Path a message with this identifier is written to.
    pub fn path_for(&self, id: &str) -> Result<PathBuf> {
        let dir = self.dir.as_deref().ok_or(FileMailerError::Configuration)?;
        Ok(dir.join(format!("{}{}", self.prefix, id)))
    }
}

/// One write of the full buffer; an empty write counts as a failure.
fn write_message(path: &Path, raw: &[u8]) -> Result<usize> {
    let write_error = |reason: String| FileMailerError::Write {
        path: path.to_path_buf(),
        reason,
    };
    if raw.is_empty() {
        return Err(write_error("nothing to write".into()));
    }
    let mut file = File::create(path).map_err(|e| write_error(e.to_string()))?;
    file.write_all(raw).map_err(|e| write_error(e.to_string()))?;
    Ok(raw.len())
}
