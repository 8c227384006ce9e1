//! Remote chat API: wire types and client.
//!
//! The widget talks to a single endpoint with one JSON POST per submit. The
//! request carries the whole transcript; the reply carries the assistant text
//! and optionally a structured payload (ingredients or recipes).
//!
//! # Wire contract
//!
//! ```text
//! POST <endpoint>
//! { "messages": [{ "role": "user", "content": "..." }, ...] }
//!
//! 200 OK
//! { "message": "...", "ingredients": [...]?, "recipes": [...]? }
//! ```
//!
//! - [`ChatApi`]: the seam the widget depends on
//! - [`HttpChatApi`]: `reqwest` implementation

pub mod http;
pub mod payload;

pub use http::HttpChatApi;
pub use payload::{Ingredient, Payload, Recipe, RecipeIngredient, RecipeStep};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One transcript entry as sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

/// Request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
}

/// Response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// Assistant text.
    pub message: String,
    #[serde(default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(default)]
    pub recipes: Option<Vec<Recipe>>,
}

impl ChatReply {
    /// Split the reply into its text and at most one payload.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<Payload>) {
        let payload = Payload::from_reply(self.ingredients, self.recipes);
        (self.message, payload)
    }
}

/// A chat request that did not produce a usable reply.
///
/// The variants only record the cause for logging; callers treat them alike.
#[derive(Debug, Error)]
pub enum RequestFailed {
    /// The request could not be sent or the body could not be read.
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("chat endpoint returned status {0}")]
    Status(u16),

    /// The body was not a valid reply.
    #[error("chat reply was malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Client for the remote chat endpoint.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// Send the full transcript and wait for the assistant's reply.
    async fn send(&self, transcript: Vec<WireMessage>) -> Result<ChatReply, RequestFailed>;
}
