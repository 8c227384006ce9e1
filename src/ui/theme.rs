//! Static colour theme.
//!
//! The theme is pure configuration: it is emitted as CSS custom properties in
//! the page head and consumed by `static/widget.css`.

use serde::{Deserialize, Serialize};

/// Light or dark colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub mode: ThemeMode,
    pub primary: String,
    pub primary_hover: String,
    pub user_bubble: String,
    pub assistant_bubble: String,
    pub list_background: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Light,
            primary: "#1976d2".to_string(),
            primary_hover: "#1565c0".to_string(),
            user_bubble: "#e3f2fd".to_string(),
            assistant_bubble: "#ffffff".to_string(),
            list_background: "#f5f5f5".to_string(),
        }
    }
}

impl Theme {
    /// Check every colour is a hex colour or a plain CSS colour name.
    pub fn validate(&self) -> Result<(), String> {
        for (key, value) in [
            ("primary", &self.primary),
            ("primary_hover", &self.primary_hover),
            ("user_bubble", &self.user_bubble),
            ("assistant_bubble", &self.assistant_bubble),
            ("list_background", &self.list_background),
        ] {
            if !is_css_color(value) {
                return Err(format!("theme.{key} is not a valid colour: {value:?}"));
            }
        }
        Ok(())
    }

    /// CSS `color-scheme` value.
    #[must_use]
    pub fn color_scheme(&self) -> &'static str {
        match self.mode {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

fn is_css_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
}
