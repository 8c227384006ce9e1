//! In-memory store of live widgets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::state::{ChatWidget, WidgetSettings};
use crate::chat::ChatApi;

/// Default idle timeout (30 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Thread-safe store for widgets, keyed by widget ID.
///
/// Every widget created here shares the same chat client and settings.
#[derive(Clone)]
pub struct WidgetStore {
    inner: Arc<WidgetStoreInner>,
}

struct WidgetStoreInner {
    widgets: RwLock<HashMap<String, ChatWidget>>,
    api: Arc<dyn ChatApi>,
    settings: WidgetSettings,
}

impl std::fmt::Debug for WidgetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetStore")
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

impl WidgetStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(api: Arc<dyn ChatApi>, settings: WidgetSettings) -> Self {
        Self {
            inner: Arc::new(WidgetStoreInner {
                widgets: RwLock::new(HashMap::new()),
                api,
                settings,
            }),
        }
    }

    /// Create a new widget and return it.
    pub async fn create(&self) -> ChatWidget {
        let id = Uuid::new_v4().to_string();
        let widget = ChatWidget::new(
            id.clone(),
            Arc::clone(&self.inner.api),
            self.inner.settings.clone(),
        );
        self.inner.widgets.write().await.insert(id, widget.clone());
        widget
    }

    /// Get a widget by ID.
    pub async fn get(&self, id: &str) -> Option<ChatWidget> {
        self.inner.widgets.read().await.get(id).cloned()
    }

    /// Remove a widget by ID.
    pub async fn remove(&self, id: &str) -> Option<ChatWidget> {
        self.inner.widgets.write().await.remove(id)
    }

    /// Number of live widgets.
    pub async fn len(&self) -> usize {
        self.inner.widgets.read().await.len()
    }

    /// Check if there are no widgets.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Remove widgets that have been idle longer than the timeout.
    ///
    /// Returns the number of widgets removed.
    pub async fn cleanup_idle(&self, timeout: Duration) -> usize {
        let candidates: Vec<ChatWidget> = self.inner.widgets.read().await.values().cloned().collect();

        let mut idle = Vec::new();
        for widget in candidates {
            if widget.is_idle_for(timeout).await {
                idle.push(widget.id().to_string());
            }
        }

        let mut guard = self.inner.widgets.write().await;
        idle.iter().filter(|id| guard.remove(id.as_str()).is_some()).count()
    }

    /// Periodically drop idle widgets until the task is aborted.
    pub fn spawn_sweeper(&self, every: Duration, idle_timeout: Duration) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = store.cleanup_idle(idle_timeout).await;
                if removed > 0 {
                    let remaining = store.len().await;
                    tracing::info!(
                        name: "widget.sweep",
                        removed,
                        remaining,
                        "Removed idle widgets"
                    );
                }
            }
        })
    }
}
