//! Access façade
//!
//! The single entry point both front ends use to touch the store. The HTTP
//! handlers and the bot dispatcher each hold a clone of [`SlotFacade`], so
//! every read and write observes one consistent state with no duplicate
//! bookkeeping.
//!
//! Lock discipline: the store sits behind one `RwLock`; content and
//! metadata always change inside the same critical section, and no lock is
//! held across an await point.

use crate::config::Config;
use crate::error::SlotError;
use crate::metadata::{self, AuthorDefault, Metadata};
use crate::store::{HistoryEntry, Store};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Aggregated statistics for the `/stats` endpoint and bot stats views.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub current_size: u64,
    pub history_entries: usize,
    pub metadata: Metadata,
    pub access_url: String,
    pub web_interface: String,
    pub public_url: bool,
    pub timestamp: String,
    pub server_status: &'static str,
    pub telegram_bot: &'static str,
}

/// Liveness snapshot for the `/health` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: String,
    pub data_exists: bool,
    pub public_url: bool,
    pub telegram_bot: &'static str,
}

/// Shared handle to the process-wide slot.
#[derive(Clone)]
pub struct SlotFacade {
    store: Arc<RwLock<Store>>,
    config: Arc<Config>,
}

impl SlotFacade {
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store::new())),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current content and metadata, without counting a view.
    pub fn current(&self) -> (String, Metadata) {
        let store = self.store.read();
        let (content, meta) = store.read();
        (content.to_string(), meta.clone())
    }

    /// Current content and metadata for a display-facing render.
    ///
    /// Increments the view counter exactly once, inside the same critical
    /// section as the read, so the returned metadata reflects the count.
    pub fn current_for_display(&self) -> (String, Metadata) {
        let mut store = self.store.write();
        store.increment_views();
        let (content, meta) = store.read();
        (content.to_string(), meta.clone())
    }

    /// Submit a new value through either front end.
    pub fn submit(
        &self,
        content: String,
        author_raw: Option<&str>,
        default: AuthorDefault,
    ) -> Result<Metadata, SlotError> {
        let mut store = self.store.write();
        Ok(store.write(content, author_raw, default))
    }

    /// Clear the slot, resetting metadata and the view counter.
    pub fn wipe(&self) -> Metadata {
        let mut store = self.store.write();
        store.clear()
    }

    /// History snapshot, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let store = self.store.read();
        store.history().iter().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.store.read().history_len()
    }

    pub fn has_data(&self) -> bool {
        !self.store.read().is_empty()
    }

    pub fn stats(&self) -> Stats {
        let store = self.store.read();
        let (content, meta) = store.read();
        Stats {
            current_size: content.len() as u64,
            history_entries: store.history_len(),
            metadata: meta.clone(),
            access_url: self.config.raw_url(),
            web_interface: self.config.public_url.clone(),
            public_url: self.config.is_public(),
            timestamp: metadata::now_string(),
            server_status: "running",
            telegram_bot: self.bot_status(),
        }
    }

    pub fn health(&self) -> Health {
        Health {
            status: "healthy",
            timestamp: metadata::now_string(),
            data_exists: self.has_data(),
            public_url: self.config.is_public(),
            telegram_bot: self.bot_status(),
        }
    }

    fn bot_status(&self) -> &'static str {
        if self.config.bot_enabled() {
            "available"
        } else {
            "not_available"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facade() -> SlotFacade {
        SlotFacade::new(Config::default())
    }

    #[test]
    fn test_submit_then_current_round_trip() {
        let slot = facade();
        slot.submit("payload".to_string(), Some("alice"), AuthorDefault::Unknown)
            .unwrap();

        let (content, meta) = slot.current();
        assert_eq!(content, "payload");
        assert_eq!(meta.author, "alice");
        assert_eq!(meta.size, 7);
    }

    #[test]
    fn test_display_read_counts_views_plain_read_does_not() {
        let slot = facade();
        slot.submit("x".to_string(), None, AuthorDefault::Api).unwrap();

        slot.current();
        slot.current();
        assert_eq!(slot.current().1.views, 0);

        let (_, meta) = slot.current_for_display();
        assert_eq!(meta.views, 1);
        assert_eq!(slot.current().1.views, 1);
    }

    #[test]
    fn test_both_front_end_paths_share_state() {
        let slot = facade();
        let http_handle = slot.clone();
        let bot_handle = slot.clone();

        http_handle
            .submit("from http".to_string(), None, AuthorDefault::Api)
            .unwrap();
        assert_eq!(bot_handle.current().0, "from http");

        bot_handle
            .submit("from bot".to_string(), Some("bob"), AuthorDefault::Unknown)
            .unwrap();
        assert_eq!(http_handle.current().0, "from bot");
        assert_eq!(http_handle.history_len(), 1);
    }

    #[test]
    fn test_stats_aggregation() {
        let slot = facade();
        slot.submit("abc".to_string(), None, AuthorDefault::Api).unwrap();
        slot.submit("defg".to_string(), None, AuthorDefault::Api).unwrap();

        let stats = slot.stats();
        assert_eq!(stats.current_size, 4);
        assert_eq!(stats.history_entries, 1);
        assert_eq!(stats.server_status, "running");
        assert_eq!(stats.telegram_bot, "not_available");
        assert!(!stats.public_url);
        assert_eq!(stats.access_url, "http://localhost:8080/raw");
    }

    #[test]
    fn test_health_flags() {
        let slot = facade();
        let health = slot.health();
        assert!(!health.data_exists);
        assert!(!health.public_url);

        slot.submit("x".to_string(), None, AuthorDefault::Api).unwrap();
        assert!(slot.health().data_exists);
    }

    #[test]
    fn test_wipe_resets_views() {
        let slot = facade();
        slot.submit("x".to_string(), None, AuthorDefault::Api).unwrap();
        slot.current_for_display();
        slot.current_for_display();

        let meta = slot.wipe();
        assert_eq!(meta.views, 0);
        assert!(!slot.has_data());
        assert_eq!(slot.history_len(), 1);
    }

    #[test]
    fn test_concurrent_writers_keep_invariants() {
        let slot = facade();
        let mut handles = Vec::new();
        for i in 0..8 {
            let slot = slot.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..50 {
                    slot.submit(format!("writer {} round {}", i, j), None, AuthorDefault::Api)
                        .unwrap();
                    slot.current_for_display();
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let (content, meta) = slot.current();
        assert_eq!(meta.size, content.len() as u64);
        assert_eq!(slot.history_len(), crate::store::HISTORY_CAP);
        assert_eq!(meta.views, 8 * 50);
    }
}
