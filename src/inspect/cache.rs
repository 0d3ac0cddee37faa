//! Parsed-message cache keyed by store filename.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::debug;

use crate::model::message::ParsedMessage;

/// Default number of parsed messages to keep.
pub const DEFAULT_CACHE_SIZE: usize = 256;

/// Keeps parsed messages so that repeated listings do not re-parse files.
///
/// Entries are keyed by filename only. Store filenames embed the capture
/// identifier, so a name is not reused for different content; removing a
/// file must remove its entry.
pub struct MessageCache {
    entries: LruCache<String, Arc<ParsedMessage>>,
}

impl MessageCache {
    /// Create a cache holding at most `capacity` messages (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, filename: &str) -> Option<Arc<ParsedMessage>> {
        let hit = self.entries.get(filename).cloned();
        debug!(filename, hit = hit.is_some(), "Message cache lookup");
        hit
    }

    pub fn insert(&mut self, filename: &str, message: ParsedMessage) -> Arc<ParsedMessage> {
        let message = Arc::new(message);
        self.entries.put(filename.to_string(), Arc::clone(&message));
        message
    }

    pub fn remove(&mut self, filename: &str) {
        self.entries.pop(filename);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}
