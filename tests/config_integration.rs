use pantry_chat::config::{AppConfig, DEFAULT_CHAT_ENDPOINT};
use pantry_chat::widget::{DEFAULT_FALLBACK_MESSAGE, OverlapPolicy};
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    // SAFETY: every test touching the environment is #[serial].
    unsafe {
        for key in [
            "PANTRY_SERVER__PORT",
            "PANTRY_CHAT__ENDPOINT",
            "PANTRY_WIDGET__OVERLAP_POLICY",
            "PANTRY_THEME__PRIMARY",
            "CONFIG_FILE",
            "PORT",
            "CHAT_ENDPOINT",
            "LOG_JSON",
        ] {
            env::remove_var(key);
        }
    }
}

fn load() -> Result<AppConfig, config::ConfigError> {
    AppConfig::load_from_args(["pantry-chat"])
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load().expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.chat.endpoint.as_str(), DEFAULT_CHAT_ENDPOINT);
    assert_eq!(config.widget.fallback_message, DEFAULT_FALLBACK_MESSAGE);
    assert_eq!(config.widget.overlap_policy, OverlapPolicy::Serialize);
    assert_eq!(config.theme.primary, "#1976d2");
    assert!(!config.logging.json);
}

#[test]
#[serial]
fn test_log_json_env_accepts_boolish_values() {
    clear_env_vars();
    // SAFETY: serial test.
    unsafe {
        env::set_var("LOG_JSON", "1");
    }
    assert!(load().expect("LOG_JSON=1").logging.json);

    // SAFETY: serial test.
    unsafe {
        env::set_var("LOG_JSON", "0");
    }
    assert!(!load().expect("LOG_JSON=0").logging.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    // SAFETY: serial test.
    unsafe {
        env::set_var("PANTRY_SERVER__PORT", "9090");
        env::set_var("PANTRY_WIDGET__OVERLAP_POLICY", "latest_wins");
    }

    let config = load().expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.widget.overlap_policy, OverlapPolicy::LatestWins);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_env_beats_prefixed_env() {
    clear_env_vars();
    // SAFETY: serial test.
    unsafe {
        env::set_var("PANTRY_SERVER__PORT", "9090");
        env::set_var("PORT", "9191");
    }

    let config = load().expect("Failed to load config");
    assert_eq!(config.server.port, 9191);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pantry.yaml");
    fs::write(
        &path,
        r#"
server:
  port: 7070
chat:
  endpoint: "http://127.0.0.1:8123/api/v1/chat"
widget:
  fallback_message: "Sorry, something went wrong."
"#,
    )
    .unwrap();

    // SAFETY: serial test.
    unsafe {
        env::set_var("CONFIG_FILE", &path);
    }

    let config = load().expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.chat.endpoint.as_str(), "http://127.0.0.1:8123/api/v1/chat");
    assert_eq!(config.widget.fallback_message, "Sorry, something went wrong.");
    // Untouched keys keep their defaults
    assert_eq!(config.widget.placeholder, "メッセージを入力...");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let result = AppConfig::load_from_args(["pantry-chat", "--config", path.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_invalid_theme_is_rejected() {
    clear_env_vars();
    // SAFETY: serial test.
    unsafe {
        env::set_var("PANTRY_THEME__PRIMARY", "red;background:url(x)");
    }

    let err = load().unwrap_err();
    assert!(err.to_string().contains("theme.primary"));

    clear_env_vars();
}
