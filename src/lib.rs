//! rawslot
//!
//! Single-slot raw text store: clients write one blob of text/JSON/code and
//! it is served back at a stable raw URL, with derived metadata (size,
//! format, timestamp, author, view count) and a bounded history of prior
//! values.
//!
//! # Architecture
//!
//! ```text
//! HTTP (axum) ──┐
//!               ├──► SlotFacade ──► Store (content + metadata + history)
//! Bot (teloxide)┘         │
//!                         ├── format detector (json/xml-html/code/text/empty)
//!                         └── metadata builder (size, author, timestamp)
//! ```
//!
//! Both front ends hold clones of one [`facade::SlotFacade`], so every
//! read and write observes the same state.

pub mod config;
pub mod error;
pub mod facade;
pub mod format;
pub mod metadata;
pub mod server;
pub mod session;
pub mod store;
pub mod telegram;
pub mod telegram_ui;

pub use config::Config;
pub use error::SlotError;
pub use facade::{Health, SlotFacade, Stats};
pub use format::{detect, ContentFormat};
pub use metadata::{AuthorDefault, Metadata};
pub use session::{SessionEvent, SessionMap, SessionState};
pub use store::{HistoryEntry, Store, HISTORY_CAP};
