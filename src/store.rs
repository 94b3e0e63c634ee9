//! Single-slot store
//!
//! Holds the one current value, its metadata, and a bounded ring of
//! snapshots of prior values. All mutation goes through the façade, which
//! serializes access; the store itself is plain synchronous state.

use crate::metadata::{self, AuthorDefault, Metadata};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of history entries kept (oldest evicted first)
pub const HISTORY_CAP: usize = 10;

/// Preview length for history snapshots, in characters
const PREVIEW_CHARS: usize = 100;

/// Marker preview recorded when the slot is cleared
const CLEARED_PREVIEW: &str = "[CLEARED BY USER]";

/// Immutable snapshot of a value at the moment it was overwritten or cleared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Content truncated to 100 chars, "..." appended if truncated
    pub preview: String,
    /// Timestamp of the *previous* value
    pub timestamp: String,
    /// Size of the *previous* value in bytes
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// The singleton slot: current content, derived metadata, bounded history.
#[derive(Debug)]
pub struct Store {
    content: String,
    metadata: Metadata,
    history: VecDeque<HistoryEntry>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            content: String::new(),
            metadata: Metadata::initial(),
            history: VecDeque::with_capacity(HISTORY_CAP),
        }
    }

    /// Replace the current value.
    ///
    /// Snapshots the prior value into history first (when non-empty), then
    /// swaps in the new content and recomputes metadata as one unit. The
    /// view counter survives the write.
    pub fn write(
        &mut self,
        content: String,
        author_raw: Option<&str>,
        default: AuthorDefault,
    ) -> Metadata {
        if !self.content.is_empty() {
            let entry = HistoryEntry {
                preview: preview_of(&self.content),
                timestamp: self.metadata.last_updated.clone(),
                size: self.metadata.size,
                action: None,
            };
            self.push_history(entry);
        }

        self.metadata = Metadata::build(&content, author_raw, default, self.metadata.views);
        self.content = content;
        self.metadata.clone()
    }

    /// Current content and metadata. Does not count as a view.
    pub fn read(&self) -> (&str, &Metadata) {
        (&self.content, &self.metadata)
    }

    /// Wipe the slot.
    ///
    /// Records a tagged history entry when there was something to clear,
    /// then resets content and metadata. This is the one operation that
    /// resets the view counter.
    pub fn clear(&mut self) -> Metadata {
        let now = metadata::now_string();

        if !self.content.is_empty() {
            let entry = HistoryEntry {
                preview: CLEARED_PREVIEW.to_string(),
                timestamp: now.clone(),
                size: 0,
                action: Some("cleared".to_string()),
            };
            self.push_history(entry);
        }

        self.content = String::new();
        self.metadata = Metadata::cleared(now);
        self.metadata.clone()
    }

    /// Snapshot history, oldest first (most-recent last).
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Count one display-facing read. Called once per dashboard render,
    /// never by programmatic reads.
    pub fn increment_views(&mut self) {
        self.metadata.views += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push_back(entry);
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate content to a 100-char preview, char-boundary safe.
fn preview_of(content: &str) -> String {
    if content.chars().count() > PREVIEW_CHARS {
        let truncated: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", truncated)
    } else {
        content.to_string()
    }
}
