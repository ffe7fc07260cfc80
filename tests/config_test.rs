//! Tests for layered settings loading
//!
//! Explicit config files override compiled defaults; MAILROOM_* variables
//! override both.

use std::fs;

use tempfile::TempDir;

use mailroom::application::{ApplicationError, OutputMode};
use mailroom::config::Settings;

#[test]
fn given_explicit_config_when_load_then_overrides_defaults() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mailroom.toml");
    fs::write(
        &path,
        r#"
api_url = "https://api.mail.test/v2"
output = "json"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load(Some(&path)).unwrap();

    // Assert
    assert_eq!(settings.api_url, "https://api.mail.test/v2");
    assert_eq!(settings.output, OutputMode::Json);
}

#[test]
fn given_missing_explicit_config_when_load_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    let err = Settings::load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { ref message } if message.contains("not found")));
}

#[test]
fn given_malformed_config_when_load_then_config_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.toml");
    fs::write(&path, "timeout_secs = \"soon\"\n").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();

    match err {
        ApplicationError::Config { message } => assert!(message.contains("broken.toml")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn given_env_token_when_load_then_env_wins_over_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mailroom.toml");
    fs::write(&path, "api_token = \"from-file\"\n").unwrap();
    std::env::set_var("MAILROOM_API_TOKEN", "from-env");

    // Act
    let settings = Settings::load(Some(&path));
    std::env::remove_var("MAILROOM_API_TOKEN");

    // Assert
    assert_eq!(settings.unwrap().api_token.as_deref(), Some("from-env"));
}

#[test]
fn given_template_when_written_and_loaded_then_defaults_unchanged() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("mailroom.toml");
    fs::write(&path, Settings::template()).unwrap();

    let settings = Settings::load(Some(&path)).unwrap();

    assert_eq!(settings.api_url, Settings::default().api_url);
    assert_eq!(settings.timeout_secs, Settings::default().timeout_secs);
}
