//! Save a delivered attachment without clobbering existing files.

use std::path::{Path, PathBuf};

use crate::model::attachment::AttachmentDownload;

/// Write `download` into `output_dir` under its suggested (sanitized) name.
///
/// Returns the path of the created file.
pub fn save_attachment(download: &AttachmentDownload, output_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let filename = sanitize_filename(&download.suggested_filename, 150);
    let path = unique_path(&output_dir.join(filename));
    std::fs::write(&path, &download.bytes)?;
    tracing::info!(
        path = %path.display(),
        bytes = download.bytes.len(),
        "Saved attachment"
    );
    Ok(path)
}

/// Replace characters that are unsafe in filenames with `_` and truncate.
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .take(max_len)
        .collect();

    let trimmed = sanitized.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "attachment".to_string()
    } else {
        trimmed.to_string()
    }
}

/// If `path` already exists, append a counter to the stem.
fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let ext = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().unwrap_or(Path::new("."));

    (1..)
        .map(|i| match ext {
            Some(ext) => parent.join(format!("{stem}_{i}.{ext}")),
            None => parent.join(format!("{stem}_{i}")),
        })
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}
