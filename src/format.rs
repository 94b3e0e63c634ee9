//! Content format detection
//!
//! Classifies a stored payload into one of a fixed set of coarse format
//! tags. Detection order matters: the JSON check runs before the XML/HTML
//! and code checks, and a malformed `{...}` falls through instead of
//! erroring.

use serde::{Deserialize, Serialize};

/// Coarse classification of the stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "xml/html")]
    XmlHtml,
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "empty")]
    Empty,
}

impl ContentFormat {
    /// Wire/display name, matching the serde rename
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::XmlHtml => "xml/html",
            Self::Code => "code",
            Self::Text => "text",
            Self::Empty => "empty",
        }
    }
}

impl std::fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the format of a text payload.
///
/// `Empty` is returned for whitespace-only input, but the write path maps
/// that verdict to `Text` so an explicit clear is the only way the slot
/// ends up tagged `empty`.
pub fn detect(content: &str) -> ContentFormat {
    let trimmed = content.trim();

    if trimmed.starts_with('{')
        && trimmed.ends_with('}')
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return ContentFormat::Json;
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return ContentFormat::XmlHtml;
    }

    if content.contains("```") {
        return ContentFormat::Code;
    }

    if trimmed.is_empty() {
        return ContentFormat::Empty;
    }

    ContentFormat::Text
}
