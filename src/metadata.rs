//! Metadata derivation
//!
//! Builds the derived facts about the current slot value on every write:
//! size, detected format, timestamp, sanitized author. The view counter is
//! carried through untouched so it survives overwrites.

use crate::format::{self, ContentFormat};
use serde::{Deserialize, Serialize};

/// Maximum author length after sanitization (header-safe)
const MAX_AUTHOR_LEN: usize = 50;

/// Default author label when the caller supplies none.
///
/// The two write endpoints deliberately differ: the browser-facing path
/// labels anonymous writes "Unknown", the programmatic `/update` path
/// labels them "API".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorDefault {
    Unknown,
    Api,
}

impl AuthorDefault {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Api => "API",
        }
    }
}

/// Derived facts about the current slot value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub last_updated: String,
    pub size: u64,
    pub format: ContentFormat,
    pub author: String,
    pub views: u64,
}

impl Metadata {
    /// State of a slot that has never been written.
    pub fn initial() -> Self {
        Self {
            last_updated: String::new(),
            size: 0,
            format: ContentFormat::Text,
            author: String::new(),
            views: 0,
        }
    }

    /// State after an explicit clear: the only way `format` becomes `empty`.
    pub fn cleared(now: String) -> Self {
        Self {
            last_updated: now,
            size: 0,
            format: ContentFormat::Empty,
            author: String::new(),
            views: 0,
        }
    }

    /// Build metadata for a freshly written value.
    ///
    /// Pure except for the timestamp. `previous_views` is carried through
    /// unchanged; an empty-string write classifies as `text`, never `empty`.
    pub fn build(
        content: &str,
        author_raw: Option<&str>,
        default: AuthorDefault,
        previous_views: u64,
    ) -> Self {
        let detected = match format::detect(content) {
            ContentFormat::Empty => ContentFormat::Text,
            other => other,
        };

        Self {
            last_updated: now_string(),
            size: content.len() as u64,
            format: detected,
            author: sanitize_author(author_raw, default),
            views: previous_views,
        }
    }
}

/// Current time in the store's wire format.
pub fn now_string() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Sanitize a caller-supplied author value for header-safe storage.
///
/// Strips all non-ASCII characters and truncates to 50; an absent or
/// fully-stripped value maps to the caller's default label.
pub fn sanitize_author(raw: Option<&str>, default: AuthorDefault) -> String {
    let cleaned: String = raw
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii())
        .take(MAX_AUTHOR_LEN)
        .collect();

    if cleaned.is_empty() {
        default.as_str().to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_non_ascii() {
        assert_eq!(sanitize_author(Some("héllo🚀 bob"), AuthorDefault::Unknown), "hllo bob");
    }

    #[test]
    fn test_sanitize_truncates_to_50() {
        let long = "x".repeat(80);
        assert_eq!(sanitize_author(Some(&long), AuthorDefault::Unknown).len(), 50);
    }

    #[test]
    fn test_sanitize_defaults_differ_per_path() {
        assert_eq!(sanitize_author(None, AuthorDefault::Unknown), "Unknown");
        assert_eq!(sanitize_author(None, AuthorDefault::Api), "API");
        // All-emoji input strips to nothing and falls back too
        assert_eq!(sanitize_author(Some("🚀🎉"), AuthorDefault::Api), "API");
    }

    #[test]
    fn test_build_size_matches_byte_length() {
        let meta = Metadata::build("日本語", None, AuthorDefault::Unknown, 0);
        assert_eq!(meta.size, "日本語".len() as u64);
    }

    #[test]
    fn test_build_preserves_views() {
        let meta = Metadata::build("hello", None, AuthorDefault::Unknown, 41);
        assert_eq!(meta.views, 41);
    }

    #[test]
    fn test_empty_write_classifies_as_text() {
        let meta = Metadata::build("", None, AuthorDefault::Api, 0);
        assert_eq!(meta.format, ContentFormat::Text);
        assert_eq!(meta.size, 0);
    }

    #[test]
    fn test_cleared_is_only_empty_source() {
        let meta = Metadata::cleared(now_string());
        assert_eq!(meta.format, ContentFormat::Empty);
        assert_eq!(meta.views, 0);
        assert_eq!(meta.author, "");
    }
}
