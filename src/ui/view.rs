//! Template-facing view models.
//!
//! Widget messages are flattened into plain serializable structs here so the
//! templates only loop and print. All formatting decisions (quantities, dates,
//! step order, link safety) live in this module.

use serde::Serialize;
use url::Url;

use crate::chat::payload::{display_date, format_quantity};
use crate::chat::{Ingredient, Payload, Recipe, Role};
use crate::widget::Message;

/// Visual variant of a message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleVariant {
    /// Right-aligned, tinted.
    User,
    /// Left-aligned, plain.
    Assistant,
}

impl From<Role> for BubbleVariant {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Assistant,
        }
    }
}

impl BubbleVariant {
    /// CSS classes for the row wrapping the bubble.
    #[must_use]
    pub fn row_classes(self) -> &'static str {
        match self {
            Self::User => "chat-row chat-row--user",
            Self::Assistant => "chat-row chat-row--assistant",
        }
    }

    /// CSS classes for the bubble itself.
    #[must_use]
    pub fn bubble_classes(self) -> &'static str {
        match self {
            Self::User => "chat-bubble chat-bubble--user",
            Self::Assistant => "chat-bubble chat-bubble--assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub role: &'static str,
    pub row_class: &'static str,
    pub bubble_class: &'static str,
    pub body: BodyView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyView {
    Text { text: String },
    Ingredients { items: Vec<IngredientView> },
    Recipes { items: Vec<RecipeView> },
}

#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    pub name: String,
    /// Quantity immediately followed by the unit, e.g. `200g`.
    pub amount: String,
    pub category: String,
    pub expiry: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineView {
    pub name: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub number: u32,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: String,
    pub name: String,
    pub ingredients: Vec<LineView>,
    pub steps: Vec<StepView>,
    /// Only set for `http`/`https` URLs.
    pub source_url: Option<String>,
    pub source_label: String,
    pub last_cooked: Option<String>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        let variant = BubbleVariant::from(message.role);
        let body = match &message.payload {
            None => BodyView::Text {
                text: message.text.clone(),
            },
            Some(Payload::Ingredients(items)) => BodyView::Ingredients {
                items: items.iter().map(IngredientView::from).collect(),
            },
            Some(Payload::Recipes(items)) => BodyView::Recipes {
                items: items.iter().map(RecipeView::from).collect(),
            },
        };

        Self {
            role: message.role.as_str(),
            row_class: variant.row_classes(),
            bubble_class: variant.bubble_classes(),
            body,
        }
    }
}

impl From<&Ingredient> for IngredientView {
    fn from(i: &Ingredient) -> Self {
        Self {
            name: i.name.clone(),
            amount: amount(i.quantity, &i.unit),
            category: i.category.clone(),
            expiry: i.expiry_date.as_deref().map(display_date),
        }
    }
}

impl From<&Recipe> for RecipeView {
    fn from(r: &Recipe) -> Self {
        let source_label = if r.source.trim().is_empty() {
            r.url.clone()
        } else {
            r.source.clone()
        };

        Self {
            id: r.id.clone(),
            name: r.name.clone(),
            ingredients: r
                .ingredients
                .iter()
                .map(|line| LineView {
                    name: line.name.clone(),
                    amount: amount(line.quantity, &line.unit),
                })
                .collect(),
            steps: r
                .ordered_steps()
                .into_iter()
                .map(|s| StepView {
                    number: s.step,
                    description: s.description.clone(),
                })
                .collect(),
            source_url: safe_link(&r.url),
            source_label,
            last_cooked: r.last_cooked.as_deref().map(display_date),
        }
    }
}

fn amount(quantity: f64, unit: &str) -> String {
    format!("{}{}", format_quantity(quantity), unit)
}

fn safe_link(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Build views for a whole transcript.
#[must_use]
pub fn message_views(messages: &[Message]) -> Vec<MessageView> {
    messages.iter().map(MessageView::from).collect()
}
