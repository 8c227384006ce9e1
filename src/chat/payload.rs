//! Structured payloads returned by the chat API.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// A pantry item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    /// Expiry date as sent by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub category: String,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

/// One numbered instruction of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    pub step: u32,
    pub description: String,
}

/// A recipe with its ingredients, instructions and source attribution.
///
/// Optional fields may arrive as `null` or be left out; both read as empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Empty when the API has not assigned an ID.
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instructions: Vec<RecipeStep>,
    /// Source URL.
    #[serde(default, alias = "source_url", deserialize_with = "null_as_default")]
    pub url: String,
    /// Human-readable source label.
    #[serde(default, alias = "source_name", deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cooked: Option<String>,
}

impl Recipe {
    /// Instructions sorted by step number.
    #[must_use]
    pub fn ordered_steps(&self) -> Vec<&RecipeStep> {
        let mut steps: Vec<&RecipeStep> = self.instructions.iter().collect();
        steps.sort_by_key(|s| s.step);
        steps
    }
}

/// Structured data attached to an assistant message.
///
/// A message carries at most one kind of payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Payload {
    Ingredients(Vec<Ingredient>),
    Recipes(Vec<Recipe>),
}

impl Payload {
    /// Pick the payload for a reply. Ingredients win over recipes; empty
    /// lists count as absent.
    #[must_use]
    pub fn from_reply(
        ingredients: Option<Vec<Ingredient>>,
        recipes: Option<Vec<Recipe>>,
    ) -> Option<Self> {
        match (ingredients, recipes) {
            (Some(items), _) if !items.is_empty() => Some(Self::Ingredients(items)),
            (_, Some(items)) if !items.is_empty() => Some(Self::Recipes(items)),
            _ => None,
        }
    }
}

/// Format a quantity without a trailing `.0` for whole numbers.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        quantity.to_string()
    }
}

/// Shorten an ISO-8601 date or date-time to `YYYY-MM-DD`.
///
/// Unrecognised input is returned unchanged.
#[must_use]
pub fn display_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.format("%Y-%m-%d").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d").to_string();
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return dt.format("%Y-%m-%d").to_string();
        }
    }
    raw.to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Id>::deserialize(deserializer)? {
        None => String::new(),
        Some(Id::Text(s)) => s,
        Some(Id::Int(n)) => n.to_string(),
        Some(Id::Float(n)) => format_quantity(n),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity: 1.0,
            unit: "個".to_string(),
            expiry_date: None,
            category: "野菜".to_string(),
        }
    }

    #[test]
    fn test_recipe_id_accepts_numbers() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": 12, "name": "カレー", "url": "https://example.com", "source": "Example"}"#,
        )
        .unwrap();
        assert_eq!(recipe.id, "12");
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_recipe_source_aliases() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": "r1", "name": "Soup", "source_url": "https://a.example", "source_name": "A"}"#,
        )
        .unwrap();
        assert_eq!(recipe.url, "https://a.example");
        assert_eq!(recipe.source, "A");
    }

    #[test]
    fn test_recipe_accepts_null_fields() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": null, "name": "肉じゃが", "ingredients": null, "url": null,
                "source": null, "last_cooked": null, "servings": 2, "category": "和食"}"#,
        )
        .unwrap();
        assert_eq!(recipe.id, "");
        assert_eq!(recipe.name, "肉じゃが");
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.url.is_empty());
        assert!(recipe.source.is_empty());
        assert_eq!(recipe.last_cooked, None);
    }

    #[test]
    fn test_recipe_id_may_be_missing() {
        let recipe: Recipe = serde_json::from_str(r#"{"name": "Soup"}"#).unwrap();
        assert_eq!(recipe.id, "");
    }

    #[test]
    fn test_ordered_steps() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id": "r1", "name": "Soup", "instructions": [
                {"step": 3, "description": "serve"},
                {"step": 1, "description": "chop"},
                {"step": 2, "description": "boil"}
            ]}"#,
        )
        .unwrap();
        let order: Vec<u32> = recipe.ordered_steps().iter().map(|s| s.step).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_payload_prefers_ingredients() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": "r1", "name": "Soup"}"#).unwrap();
        let payload = Payload::from_reply(Some(vec![ingredient("玉ねぎ")]), Some(vec![recipe.clone()]));
        assert!(matches!(payload, Some(Payload::Ingredients(_))));

        let payload = Payload::from_reply(Some(vec![]), Some(vec![recipe]));
        assert!(matches!(payload, Some(Payload::Recipes(_))));

        assert_eq!(Payload::from_reply(Some(vec![]), Some(vec![])), None);
        assert_eq!(Payload::from_reply(None, None), None);
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(250.0), "250");
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2024-05-01"), "2024-05-01");
        assert_eq!(display_date("2024-05-01T10:00:00"), "2024-05-01");
        assert_eq!(display_date("2024-05-01T10:00:00.123456"), "2024-05-01");
        assert_eq!(display_date("2024-05-01T10:00:00+09:00"), "2024-05-01");
        assert_eq!(display_date("next week"), "next week");
    }
}
