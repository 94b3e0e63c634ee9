//! Telegram UI components
//!
//! Inline keyboards, callback data encoding, and message formatting for the
//! bot front end. Pure functions over façade snapshots so they stay
//! testable without a live bot.

use crate::config::Config;
use crate::facade::Stats;
use crate::metadata::Metadata;
use crate::store::HistoryEntry;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Button action types for callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    UpdateData,
    ViewData,
    GetLink,
    Stats,
    History,
    Help,
    Menu,
    ConfirmClear,
    CancelClear,
}

impl MenuAction {
    /// Encode action as callback data string
    pub fn encode(&self) -> String {
        match self {
            Self::UpdateData => "update_data",
            Self::ViewData => "view_data",
            Self::GetLink => "get_link",
            Self::Stats => "stats",
            Self::History => "history",
            Self::Help => "help",
            Self::Menu => "menu",
            Self::ConfirmClear => "confirm_clear",
            Self::CancelClear => "cancel_clear",
        }
        .to_string()
    }

    /// Decode callback data string to action
    pub fn decode(data: &str) -> Option<Self> {
        match data {
            "update_data" => Some(Self::UpdateData),
            "view_data" => Some(Self::ViewData),
            "get_link" => Some(Self::GetLink),
            "stats" => Some(Self::Stats),
            "history" => Some(Self::History),
            "help" => Some(Self::Help),
            "menu" => Some(Self::Menu),
            "confirm_clear" => Some(Self::ConfirmClear),
            "cancel_clear" => Some(Self::CancelClear),
            _ => None,
        }
    }
}

/// Main menu keyboard; the web-interface button only appears when the
/// public URL actually resolves outside this host.
pub fn main_menu_keyboard(config: &Config) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("Update Data", MenuAction::UpdateData.encode()),
            InlineKeyboardButton::callback("View Data", MenuAction::ViewData.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("Get Raw Link", MenuAction::GetLink.encode()),
            InlineKeyboardButton::callback("Statistics", MenuAction::Stats.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("Help", MenuAction::Help.encode()),
            InlineKeyboardButton::callback("History", MenuAction::History.encode()),
        ],
    ];

    if config.is_public() {
        if let Ok(url) = config.public_url.parse() {
            rows.push(vec![InlineKeyboardButton::url("Web Interface", url)]);
        }
    }

    InlineKeyboardMarkup::new(rows)
}

/// Keyboard offered after a successful store
pub fn after_store_keyboard(config: &Config) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![
            InlineKeyboardButton::callback("Get Links", MenuAction::GetLink.encode()),
            InlineKeyboardButton::callback("View Stats", MenuAction::Stats.encode()),
        ],
        vec![
            InlineKeyboardButton::callback("View Data", MenuAction::ViewData.encode()),
            InlineKeyboardButton::callback("Update Again", MenuAction::UpdateData.encode()),
        ],
    ];

    if config.is_public() {
        if let Ok(url) = config.public_url.parse() {
            rows.push(vec![InlineKeyboardButton::url("Web Interface", url)]);
        }
    }

    InlineKeyboardMarkup::new(rows)
}

/// Confirm/deny keyboard for the clear flow
pub fn confirm_clear_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("Yes, Clear All", MenuAction::ConfirmClear.encode()),
        InlineKeyboardButton::callback("No, Cancel", MenuAction::CancelClear.encode()),
    ]])
}

/// Single "back to menu" button
pub fn menu_button_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Main Menu",
        MenuAction::Menu.encode(),
    )]])
}

// ============ Message formatting ============

/// First 5 lines of the content, with a trailing line count marker
pub fn content_preview(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut preview = lines.iter().take(5).cloned().collect::<Vec<_>>().join("\n");
    if lines.len() > 5 {
        preview.push_str(&format!("\n[... and {} more lines]", lines.len() - 5));
    }
    preview
}

/// Stored-data preview message for the "view data" button
pub fn format_view_data(content: &str, metadata: &Metadata, config: &Config) -> String {
    let mut text = format!(
        "Stored Data Preview ({}):\n\n```\n{}\n```\n\nSize: {} bytes\nLast Updated: {}\nAuthor: {}\nViews: {}\n\nRAW URL: `{}`",
        metadata.format,
        content_preview(content),
        metadata.size,
        metadata.last_updated,
        metadata.author,
        metadata.views,
        config.raw_url(),
    );

    if config.is_public() {
        text.push_str(&format!("\nWeb: `{}`", config.public_url));
    }

    text
}

/// Stats message shared by the /stats command and the stats button
pub fn format_stats(stats: &Stats) -> String {
    format!(
        "Statistics:\n\n\
         - Data Size: {} bytes\n\
         - Format: {}\n\
         - Last Updated: {}\n\
         - Storage: {}\n\
         - History Entries: {}\n\
         - Author: {}\n\
         - Total Views: {}\n\n\
         RAW URL: `{}`",
        stats.current_size,
        stats.metadata.format,
        display_or(&stats.metadata.last_updated, "Never"),
        if stats.current_size == 0 { "Empty" } else { "Contains data" },
        stats.history_entries,
        display_or(&stats.metadata.author, "Not specified"),
        stats.metadata.views,
        stats.access_url,
    )
}

/// Available-links message for /link and the link button
pub fn format_links(config: &Config) -> String {
    let mut text = format!(
        "Available Links:\n\nRAW Text:\n`{}`\n\nJSON Format:\n`{}?format=json`\n",
        config.raw_url(),
        config.raw_url(),
    );

    if config.is_public() {
        text.push_str(&format!(
            "\nWeb Interface:\n`{}`\n\nStatistics:\n`{}/stats`\n",
            config.public_url, config.public_url,
        ));
    }

    text
}

/// History listing, most recent first
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history available yet. Update some data first!".to_string();
    }

    let mut text = format!("Last {} Updates:\n\n", entries.len());
    for (i, entry) in entries.iter().rev().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, entry.timestamp));
        text.push_str(&format!("   Size: {} bytes\n", entry.size));
        if let Some(ref action) = entry.action {
            text.push_str(&format!("   Action: {}\n", action));
        }
        let short: String = entry.preview.chars().take(50).collect();
        text.push_str(&format!("   Preview: {}\n\n", short));
    }
    text
}

/// Confirmation message after a successful store
pub fn format_store_success(metadata: &Metadata, config: &Config) -> String {
    let mut text = format!(
        "Data stored successfully!\n\nSize: {} bytes\nFormat: {}\nTimestamp: {}\nURL: `{}`\n",
        metadata.size,
        metadata.format,
        metadata.last_updated,
        config.raw_url(),
    );

    if !config.is_public() {
        text.push_str("\nNote: web interface requires a public URL\n");
    }

    text
}

fn display_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
