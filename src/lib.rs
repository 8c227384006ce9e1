//! Pantry Chat
//!
//! A single-page chat widget for a kitchen assistant. The widget keeps a
//! transcript, posts it to a remote chat API on every submit, and renders the
//! replies, including structured ingredient and recipe lists.
//!
//! # Architecture
//!
//! - **Server**: Axum serves the widget page and the HTMX submit endpoint
//! - **Widget**: per-page-load transcript state with explicit mutation points
//! - **Chat API**: one JSON POST per submit via `reqwest`
//! - **UI**: server-rendered HTML (minijinja) + HTMX
//!
//! # Modules
//!
//! - [`chat`]: wire types and the remote chat client
//! - [`widget`]: widget state, submit cycle and store
//! - [`ui`]: page and fragment rendering
//! - [`config`]: layered configuration
//! - [`server`]: router and handlers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod chat;
pub mod config;
pub mod server;
pub mod ui;
pub mod widget;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::ui::Renderer;
use crate::widget::WidgetStore;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Live widgets, one per page load.
    pub widgets: WidgetStore,
    /// Page and fragment renderer.
    pub renderer: Arc<Renderer>,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
