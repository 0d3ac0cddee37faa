//! Inspection side of the store: the directory listing is the index.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{FileMailerError, Result};

/// A captured message file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

/// List the regular files in the store directory, sorted by name.
///
/// A missing directory is an empty store. Files that disappear while the
/// listing runs are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<StoredFile>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| FileMailerError::io(dir, e))? {
        let entry = entry.map_err(|e| FileMailerError::io(dir, e))?;
        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(FileMailerError::io(&path, e)),
        };
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()
            .map_err(|e| FileMailerError::io(&path, e))?;
        files.push(StoredFile {
            filename: entry.file_name().to_string_lossy().into_owned(),
            path,
            modified: DateTime::<Utc>::from(modified),
        });
    }

    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    debug!(dir = %dir.display(), count = files.len(), "Listed stored messages");
    Ok(files)
}

/// Read a stored message. A vanished file is [`FileMailerError::NotFound`].
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    debug!(path = %path.display(), "Reading stored message");
    fs::read(path).map_err(|e| FileMailerError::io(path, e))
}

/// Delete a stored message. Returns `false` if it was already gone.
pub fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileMailerError::io(path, e)),
    }
}
