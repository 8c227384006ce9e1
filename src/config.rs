use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use config::{Config, Environment, File};
use serde::Deserialize;
use url::Url;

use crate::ui::{PageSettings, Theme};
use crate::widget::{DEFAULT_FALLBACK_MESSAGE, DEFAULT_IDLE_TIMEOUT, OverlapPolicy, WidgetSettings};

/// Default chat endpoint (a local backend).
pub const DEFAULT_CHAT_ENDPOINT: &str = "http://localhost:8000/api/v1/chat";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Remote chat endpoint
    #[arg(long, env = "CHAT_ENDPOINT")]
    pub chat_endpoint: Option<String>,

    /// Emit logs as JSON (`LOG_JSON` accepts 1/0, true/false, yes/no)
    #[arg(long, env = "LOG_JSON", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    pub log_json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub chat: ChatConfig,
    pub widget: WidgetConfig,
    #[serde(default)]
    pub theme: Theme,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    pub endpoint: Url,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WidgetConfig {
    pub title: String,
    pub placeholder: String,
    pub fallback_message: String,
    pub overlap_policy: OverlapPolicy,
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    pub htmx_src: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from_args(std::env::args())
    }

    pub fn load_from_args<I, T>(args: I) -> Result<Self, config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;

        let theme = Theme::default();
        let mut builder = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.static_dir", "static")?
            .set_default("chat.endpoint", DEFAULT_CHAT_ENDPOINT)?
            .set_default("widget.title", "Pantry Chat")?
            .set_default("widget.placeholder", "メッセージを入力...")?
            .set_default("widget.fallback_message", DEFAULT_FALLBACK_MESSAGE)?
            .set_default("widget.overlap_policy", "serialize")?
            .set_default(
                "widget.idle_timeout_secs",
                i64::try_from(DEFAULT_IDLE_TIMEOUT.as_secs()).unwrap_or(i64::MAX),
            )?
            .set_default("widget.sweep_interval_secs", 60)?
            .set_default("widget.htmx_src", "https://unpkg.com/htmx.org@2.0.8/dist/htmx.min.js")?
            .set_default("theme.mode", "light")?
            .set_default("theme.primary", theme.primary)?
            .set_default("theme.primary_hover", theme.primary_hover)?
            .set_default("theme.user_bubble", theme.user_bubble)?
            .set_default("theme.assistant_bubble", theme.assistant_bubble)?
            .set_default("theme.list_background", theme.list_background)?
            .set_default("logging.json", false)?;

        // Config file: explicit path must exist, ./config.* is optional.
        builder = match &cli.config {
            Some(path) => builder.add_source(File::with_name(path).required(true)),
            None => builder.add_source(File::with_name("config").required(false)),
        };

        // PANTRY_SERVER__PORT=8080, PANTRY_CHAT__ENDPOINT=..., etc.
        builder = builder.add_source(
            Environment::with_prefix("PANTRY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Priority: CLI flag > CLI env var > PANTRY_ env > config file > defaults.
        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", i64::from(port))?;
        }
        if let Some(endpoint) = cli.chat_endpoint {
            builder = builder.set_override("chat.endpoint", endpoint)?;
        }
        if cli.log_json {
            builder = builder.set_override("logging.json", true)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !matches!(self.chat.endpoint.scheme(), "http" | "https") {
            return Err(config::ConfigError::Message(format!(
                "chat.endpoint must be an http(s) URL, got {}",
                self.chat.endpoint
            )));
        }
        if self.widget.fallback_message.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "widget.fallback_message cannot be empty".to_string(),
            ));
        }
        if self.widget.sweep_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "widget.sweep_interval_secs must be positive".to_string(),
            ));
        }
        self.theme.validate().map_err(config::ConfigError::Message)
    }

    /// Behaviour settings for new widgets.
    #[must_use]
    pub fn widget_settings(&self) -> WidgetSettings {
        WidgetSettings {
            overlap_policy: self.widget.overlap_policy,
            fallback_message: self.widget.fallback_message.clone(),
        }
    }

    /// Page settings for the renderer.
    #[must_use]
    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            title: self.widget.title.clone(),
            placeholder: self.widget.placeholder.clone(),
            htmx_src: self.widget.htmx_src.clone(),
            theme: self.theme.clone(),
        }
    }
}
