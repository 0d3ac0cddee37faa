//! Inspection of captured mail: autoremove, listing, delete-all and
//! attachment delivery.
//!
//! Every operation runs to completion within the call. Reads are not
//! coordinated with concurrent captures or deletes: a file that disappears
//! between listing and parsing is skipped.

pub mod cache;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::PanelConfig;
use crate::error::{FileMailerError, Result};
use crate::model::attachment::AttachmentDownload;
use crate::model::message::ParsedMessage;
use crate::parser;
use crate::store::reader;

pub use cache::MessageCache;

/// Result of a listing: messages newest first and how many of them are new.
#[derive(Debug, Clone, Default)]
pub struct MessageListing {
    pub messages: Vec<Arc<ParsedMessage>>,
    pub count_new: usize,
}

impl MessageListing {
    pub fn count_all(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether anything should be shown at all.
    pub fn is_visible(&self, hide_empty: bool) -> bool {
        !(hide_empty && self.is_empty())
    }
}

/// Reads the store directory on behalf of a developer tool.
pub struct Inspector {
    dir: PathBuf,
    settings: PanelConfig,
    cache: MessageCache,
}

impl Inspector {
    pub fn new(dir: impl Into<PathBuf>, settings: PanelConfig) -> Self {
        let cache = MessageCache::new(settings.cache_size);
        Self {
            dir: dir.into(),
            settings,
            cache,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn settings(&self) -> &PanelConfig {
        &self.settings
    }

    /// Apply the configured autoremove policy relative to the current time.
    ///
    /// Returns the number of deleted files; zero when the policy is disabled.
    pub fn autoremove(&mut self) -> Result<usize> {
        self.autoremove_at(Utc::now())
    }

    fn autoremove_at(&mut self, now: DateTime<Utc>) -> Result<usize> {
        match self.settings.autoremove.clone() {
            Some(age) => self.autoremove_before(age.apply(now)),
            None => Ok(0),
        }
    }

    /// Delete every stored file modified before `cutoff` along with its cache entry.
    pub fn autoremove_before(&mut self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        for file in reader::list_files(&self.dir)? {
            if file.modified >= cutoff {
                continue;
            }
            self.cache.remove(&file.filename);
            if reader::remove_file(&file.path)? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!(dir = %self.dir.display(), removed, %cutoff, "Autoremoved old messages");
        }
        Ok(removed)
    }

    /// List all stored messages, newest first.
    pub fn list_messages(&mut self) -> Result<MessageListing> {
        self.list_messages_at(Utc::now())
    }

    /// [`list_messages`](Self::list_messages) with an explicit "now".
    ///
    /// Autoremove runs first. Files that vanished or cannot be parsed are
    /// left out. Messages without a date sort last and are never new.
    pub fn list_messages_at(&mut self, now: DateTime<Utc>) -> Result<MessageListing> {
        if !self.dir.is_dir() {
            return Ok(MessageListing::default());
        }
        self.autoremove_at(now)?;

        let mut messages = Vec::new();
        for file in reader::list_files(&self.dir)? {
            match self.load(&file.filename, &file.path) {
                Ok(message) => messages.push(message),
                Err(e) if e.is_skippable() => {
                    warn!(filename = %file.filename, error = %e, "Skipping stored message");
                }
                Err(e) => return Err(e),
            }
        }

        // Newest first; `None` < `Some(_)`, so undated messages end up last
        messages.sort_by(|a, b| b.date.cmp(&a.date));

        let since = self.settings.new_message_time.apply(now);
        let count_new = messages.iter().filter(|m| m.is_new(since)).count();
        debug!(count = messages.len(), count_new, "Listed messages");

        Ok(MessageListing {
            messages,
            count_new,
        })
    }

    /// A single stored message, from the cache or freshly parsed.
    ///
    /// The file must still exist: a message removed behind the inspector's
    /// back is dropped from the cache and reported as `NotFound`.
    pub fn message(&mut self, filename: &str) -> Result<Arc<ParsedMessage>> {
        let path = self.path_of(filename)?;
        if let Err(e) = fs::metadata(&path) {
            self.cache.remove(filename);
            return Err(FileMailerError::io(&path, e));
        }
        self.load(filename, &path)
    }

    /// Delete every stored file and empty the cache.
    pub fn delete_all(&mut self) -> Result<usize> {
        self.cache.clear();
        let mut removed = 0;
        for file in reader::list_files(&self.dir)? {
            if reader::remove_file(&file.path)? {
                removed += 1;
            }
        }
        info!(dir = %self.dir.display(), removed, "Deleted all messages");
        Ok(removed)
    }

    /// Decode one attachment of a stored message.
    ///
    /// The whole payload is decoded into memory.
    pub fn download_attachment(&mut self, filename: &str, key: &str) -> Result<AttachmentDownload> {
        let message = self.message(filename)?;
        let attachment = message.attachments.get(key).ok_or_else(|| {
            FileMailerError::NotFound(format!("attachment '{key}' in '{filename}'"))
        })?;
        attachment.download()
    }

    fn load(&mut self, filename: &str, path: &Path) -> Result<Arc<ParsedMessage>> {
        if let Some(message) = self.cache.get(filename) {
            return Ok(message);
        }
        let raw = reader::read_file(path)?;
        let message = parser::parse(&raw, Some(filename))?;
        Ok(self.cache.insert(filename, message))
    }

    /// Resolve a filename inside the store, rejecting anything that is not a
    /// plain file name.
    fn path_of(&self, filename: &str) -> Result<PathBuf> {
        let plain = !filename.is_empty()
            && Path::new(filename).file_name().and_then(|n| n.to_str()) == Some(filename);
        if !plain {
            return Err(FileMailerError::NotFound(filename.to_string()));
        }
        Ok(self.dir.join(filename))
    }
}
