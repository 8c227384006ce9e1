//! Server-side rendering of the chat widget.
//!
//! Templates live in `src/ui/templates` and are compiled into the binary.
//! `minijinja` auto-escapes every `.html` template, so message text and
//! payload fields can never inject markup.
//!
//! # Structure
//!
//! - [`Renderer`]: renders the full page and the fragment swapped in after a submit
//! - [`view`]: view models built from widget messages
//! - [`theme`]: static colour configuration

pub mod theme;
pub mod view;

use minijinja::{Environment, context};
use thiserror::Error;

pub use theme::{Theme, ThemeMode};

use crate::widget::WidgetSnapshot;

const PAGE_TEMPLATE: &str = "page.html";
const UPDATE_TEMPLATE: &str = "update.html";

/// Rendering failed.
#[derive(Debug, Error)]
#[error("template rendering failed: {0}")]
pub struct RenderError(#[from] minijinja::Error);

/// Static page settings.
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
    pub placeholder: String,
    /// Where the page loads HTMX from.
    pub htmx_src: String,
    pub theme: Theme,
}

/// Renders widget pages and fragments.
#[derive(Debug)]
pub struct Renderer {
    env: Environment<'static>,
    page: PageSettings,
}

impl Renderer {
    /// Compile the templates.
    pub fn new(page: PageSettings) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(PAGE_TEMPLATE, include_str!("templates/page.html"))?;
        env.add_template(UPDATE_TEMPLATE, include_str!("templates/update.html"))?;
        env.add_template("messages.html", include_str!("templates/messages.html"))?;
        env.add_template("input.html", include_str!("templates/input.html"))?;
        Ok(Self { env, page })
    }

    /// Render the full widget page.
    pub fn page(&self, widget: &WidgetSnapshot) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(PAGE_TEMPLATE)?;
        let html = tmpl.render(context! {
            title => &self.page.title,
            htmx_src => &self.page.htmx_src,
            theme => &self.page.theme,
            color_scheme => self.page.theme.color_scheme(),
            widget_id => &widget.id,
            placeholder => &self.page.placeholder,
            input => &widget.input,
            awaiting_response => widget.awaiting_response,
            messages => view::message_views(&widget.messages),
            oob => false,
        })?;
        Ok(html)
    }

    /// Render the fragment swapped in after each submit: the message list,
    /// plus the input field as an out-of-band swap carrying the draft.
    pub fn update(&self, widget: &WidgetSnapshot) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(UPDATE_TEMPLATE)?;
        let html = tmpl.render(context! {
            placeholder => &self.page.placeholder,
            input => &widget.input,
            awaiting_response => widget.awaiting_response,
            messages => view::message_views(&widget.messages),
            oob => true,
        })?;
        Ok(html)
    }
}
