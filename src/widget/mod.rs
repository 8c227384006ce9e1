//! Chat widget state and storage.
//!
//! A [`ChatWidget`] owns an append-only transcript and the draft input. Its
//! state changes only at three points of the submit cycle: when the user
//! message is appended, when the reply arrives, and when the request fails.
//! No lock is held while the request is in flight.
//!
//! A fresh widget is created for every page load and kept in the
//! [`WidgetStore`] until it has been idle for too long.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pantry_chat::chat::HttpChatApi;
//! use pantry_chat::widget::{WidgetSettings, WidgetStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = HttpChatApi::new("http://localhost:8000/api/v1/chat".parse()?);
//! let store = WidgetStore::new(Arc::new(api), WidgetSettings::default());
//!
//! let widget = store.create().await;
//! widget.submit("冷蔵庫に何がある?").await;
//! assert_eq!(widget.message_count().await, 2);
//! # Ok(())
//! # }
//! ```

mod state;
mod store;

pub use state::{
    ChatWidget, DEFAULT_FALLBACK_MESSAGE, Message, OverlapPolicy, SubmitOutcome, WidgetSettings,
    WidgetSnapshot,
};
pub use store::{DEFAULT_IDLE_TIMEOUT, WidgetStore};
