//! `reqwest` client for the chat endpoint.

use url::Url;

use super::{ChatApi, ChatReply, ChatRequest, RequestFailed, WireMessage};

/// Sends transcripts to the configured chat endpoint over HTTP.
#[derive(Clone)]
pub struct HttpChatApi {
    http: reqwest::Client,
    endpoint: Url,
}

impl std::fmt::Debug for HttpChatApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpChatApi")
            .field("endpoint", &self.endpoint.as_str())
            .finish()
    }
}

impl HttpChatApi {
    /// Create a client for the given endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self::with_client(endpoint, reqwest::Client::new())
    }

    /// Create a client with a custom `reqwest` client.
    #[must_use]
    pub fn with_client(endpoint: Url, http: reqwest::Client) -> Self {
        Self { http, endpoint }
    }
}

#[async_trait::async_trait]
impl ChatApi for HttpChatApi {
    async fn send(&self, transcript: Vec<WireMessage>) -> Result<ChatReply, RequestFailed> {
        let body = ChatRequest {
            messages: transcript,
        };

        tracing::debug!(
            name: "chat.request.sent",
            endpoint = %self.endpoint,
            message_count = body.messages.len(),
            "Posting transcript to chat endpoint"
        );

        let resp = self
            .http
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestFailed::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&bytes)?;

        tracing::debug!(
            name: "chat.request.completed",
            endpoint = %self.endpoint,
            reply_length = reply.message.len(),
            has_ingredients = reply.ingredients.is_some(),
            has_recipes = reply.recipes.is_some(),
            "Chat endpoint replied"
        );

        Ok(reply)
    }
}
