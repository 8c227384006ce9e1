//! A single chat widget and its submit cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::chat::{ChatApi, ChatReply, Payload, RequestFailed, Role, WireMessage};

/// Fallback assistant text shown when a request fails.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "申し訳ありません。エラーが発生しました。";

/// What happens when a submit arrives while another request is outstanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// Reject the new submit until the outstanding request settles.
    #[default]
    Serialize,
    /// Accept every submit; only the reply to the latest request is appended.
    LatestWins,
}

/// Per-widget behaviour settings.
#[derive(Debug, Clone)]
pub struct WidgetSettings {
    pub overlap_policy: OverlapPolicy,
    pub fallback_message: String,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            overlap_policy: OverlapPolicy::default(),
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        }
    }
}

/// A message in the widget's transcript. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl Message {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            payload: None,
        }
    }

    fn assistant(text: impl Into<String>, payload: Option<Payload>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            payload,
        }
    }

    fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.text.clone(),
        }
    }
}

/// Result of a call to [`ChatWidget::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing appended, nothing sent.
    Ignored,
    /// Another request is outstanding and the policy rejects overlap.
    Busy,
    /// The assistant's reply was appended.
    Replied,
    /// The request failed and the fallback message was appended.
    Failed,
    /// A newer request started before this one settled; its result was dropped.
    Superseded,
}

/// Read-only copy of a widget's state for rendering.
#[derive(Debug, Clone)]
pub struct WidgetSnapshot {
    pub id: String,
    pub messages: Vec<Message>,
    pub input: String,
    pub awaiting_response: bool,
}

/// Chat widget owning its transcript and the draft input.
///
/// Cloning is cheap and yields a handle to the same widget.
#[derive(Clone)]
pub struct ChatWidget {
    inner: Arc<WidgetInner>,
}

struct WidgetInner {
    id: String,
    api: Arc<dyn ChatApi>,
    settings: WidgetSettings,
    state: RwLock<WidgetState>,
}

#[derive(Debug)]
struct WidgetState {
    messages: Vec<Message>,
    input: String,
    in_flight: usize,
    last_request: u64,
    last_activity: DateTime<Utc>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("id", &self.inner.id)
            .field("settings", &self.inner.settings)
            .finish_non_exhaustive()
    }
}

/// Issued by `begin` for one accepted submit.
struct Ticket {
    seq: u64,
    transcript: Vec<WireMessage>,
}

impl ChatWidget {
    /// Create an empty widget.
    #[must_use]
    pub fn new(id: impl Into<String>, api: Arc<dyn ChatApi>, settings: WidgetSettings) -> Self {
        let now = Utc::now();
        Self {
            inner: Arc::new(WidgetInner {
                id: id.into(),
                api,
                settings,
                state: RwLock::new(WidgetState {
                    messages: Vec::new(),
                    input: String::new(),
                    in_flight: 0,
                    last_request: 0,
                    last_activity: now,
                }),
            }),
        }
    }

    /// Widget ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// All messages in display order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.state.read().await.messages.clone()
    }

    /// Number of messages.
    pub async fn message_count(&self) -> usize {
        self.inner.state.read().await.messages.len()
    }

    /// Whether a request is outstanding.
    pub async fn is_awaiting_response(&self) -> bool {
        self.inner.state.read().await.in_flight > 0
    }

    /// Copy everything needed to render the widget.
    pub async fn snapshot(&self) -> WidgetSnapshot {
        let state = self.inner.state.read().await;
        WidgetSnapshot {
            id: self.inner.id.clone(),
            messages: state.messages.clone(),
            input: state.input.clone(),
            awaiting_response: state.in_flight > 0,
        }
    }

    /// Submit user text.
    ///
    /// Blank text is ignored. Otherwise the user message is appended, the
    /// input is cleared and the full transcript is sent. A submit rejected as
    /// [`SubmitOutcome::Busy`] keeps its text as the draft input. The reply, or the
    /// fallback message on failure, is appended once the request settles.
    ///
    /// The request runs on its own task so the widget still settles if the
    /// caller is dropped mid-request.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let Some(ticket) = self.begin(text).await else {
            tracing::debug!(
                name: "widget.submit.busy",
                widget_id = %self.inner.id,
                "Submit rejected while a request is outstanding"
            );
            return SubmitOutcome::Busy;
        };

        let widget = self.clone();
        let handle = tokio::spawn(async move {
            let seq = ticket.seq;
            let result = widget.inner.api.send(ticket.transcript).await;
            widget.settle(seq, result).await
        });

        match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    name: "widget.submit.aborted",
                    widget_id = %self.inner.id,
                    error = %e,
                    "Submit task did not finish"
                );
                self.abandon().await;
                SubmitOutcome::Failed
            }
        }
    }

    /// Submit-start: append the user message and snapshot the transcript.
    async fn begin(&self, text: &str) -> Option<Ticket> {
        let mut state = self.inner.state.write().await;

        if self.inner.settings.overlap_policy == OverlapPolicy::Serialize && state.in_flight > 0 {
            state.input = text.to_string();
            state.last_activity = Utc::now();
            return None;
        }

        state.messages.push(Message::user(text));
        state.input.clear();
        state.in_flight += 1;
        state.last_request += 1;
        state.last_activity = Utc::now();

        tracing::info!(
            name: "widget.submit.started",
            widget_id = %self.inner.id,
            request_seq = state.last_request,
            message_count = state.messages.len(),
            "Submitting transcript"
        );

        Some(Ticket {
            seq: state.last_request,
            transcript: state.messages.iter().map(Message::to_wire).collect(),
        })
    }

    /// Submit-success and submit-failure.
    async fn settle(&self, seq: u64, result: Result<ChatReply, RequestFailed>) -> SubmitOutcome {
        let mut state = self.inner.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
        state.last_activity = Utc::now();

        if self.inner.settings.overlap_policy == OverlapPolicy::LatestWins
            && seq != state.last_request
        {
            tracing::info!(
                name: "widget.submit.superseded",
                widget_id = %self.inner.id,
                request_seq = seq,
                latest_seq = state.last_request,
                "Dropping result of a superseded request"
            );
            return SubmitOutcome::Superseded;
        }

        match result {
            Ok(reply) => {
                let (text, payload) = reply.into_parts();
                state.messages.push(Message::assistant(text, payload));
                tracing::info!(
                    name: "widget.submit.replied",
                    widget_id = %self.inner.id,
                    request_seq = seq,
                    message_count = state.messages.len(),
                    "Assistant reply appended"
                );
                SubmitOutcome::Replied
            }
            Err(e) => {
                tracing::warn!(
                    name: "widget.submit.failed",
                    widget_id = %self.inner.id,
                    request_seq = seq,
                    error = %e,
                    "Chat request failed, appending fallback message"
                );
                state.messages.push(Message::assistant(
                    self.inner.settings.fallback_message.clone(),
                    None,
                ));
                SubmitOutcome::Failed
            }
        }
    }

    /// Release the in-flight slot of a request whose task died.
    async fn abandon(&self) {
        let mut state = self.inner.state.write().await;
        state.in_flight = state.in_flight.saturating_sub(1);
    }

    /// Whether the widget has been idle for longer than `timeout`.
    ///
    /// A widget with an outstanding request is never considered idle.
    pub async fn is_idle_for(&self, timeout: Duration) -> bool {
        let state = self.inner.state.read().await;
        if state.in_flight > 0 {
            return false;
        }
        (Utc::now() - state.last_activity)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }
}
