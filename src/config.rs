//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/mailroom/mailroom.toml`
//! 3. Explicit config file: `--config <file>`
//! 4. Environment variables: `MAILROOM_*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, OutputMode};

/// Unified configuration for mailroom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the service API
    pub api_url: String,
    /// Bearer token sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Deadline for a whole command, in seconds (0 = none)
    pub timeout_secs: u64,
    /// Default output mode
    pub output: OutputMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "https://api.mailroom.invalid/v1".into(),
            api_token: None,
            timeout_secs: 60,
            output: OutputMode::Text,
        }
    }
}

/// Raw settings for intermediate parsing (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output: Option<OutputMode>,
}

/// Get the XDG config directory for mailroom.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mailroom").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("mailroom.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Deadline for one command, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_url: overlay
                .api_url
                .clone()
                .unwrap_or_else(|| self.api_url.clone()),
            api_token: overlay.api_token.clone().or_else(|| self.api_token.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            output: overlay.output.unwrap_or(self.output),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `explicit` - Optional config file given on the command line; must exist
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/mailroom/mailroom.toml`
    /// 3. Explicit config file
    /// 4. Environment variables: `MAILROOM_*` prefix
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Apply MAILROOM_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("MAILROOM"))
            .build()
            .map_err(config_err)?;

        let mut overlay = RawSettings::default();
        if let Ok(val) = config.get_string("api_url") {
            overlay.api_url = Some(val);
        }
        if let Ok(val) = config.get_string("api_token") {
            overlay.api_token = Some(val);
        }
        if let Ok(val) = config.get_string("timeout_secs") {
            let secs = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("MAILROOM_TIMEOUT_SECS: {e}"),
            })?;
            overlay.timeout_secs = Some(secs);
        }
        if let Ok(val) = config.get_string("output") {
            overlay.output = Some(parse_output(&val)?);
        }

        Ok(settings.merge_with(&overlay))
    }

    /// Show the effective configuration as TOML. The token is masked.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let mut shown = self.clone();
        if shown.api_token.is_some() {
            shown.api_token = Some("********".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# mailroom configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/mailroom/mailroom.toml
#   Explicit: --config <file>
#   Env:      MAILROOM_* environment variables (e.g. MAILROOM_API_TOKEN)

# Base URL of the service API
# api_url = "https://api.example.com/v1"

# Bearer token (prefer MAILROOM_API_TOKEN over storing it here)
# api_token = "..."

# Deadline for one command in seconds; 0 disables it
# timeout_secs = 60

# Default output: "text" or "json"
# output = "text"
"#
        .to_string()
    }
}

fn parse_output(val: &str) -> Result<OutputMode, ApplicationError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "text" => Ok(OutputMode::Text),
        "json" => Ok(OutputMode::Json),
        other => Err(ApplicationError::Config {
            message: format!("unknown output mode: {other}"),
        }),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_has_timeout_and_text_output() {
        let settings = Settings::default();
        assert_eq!(settings.timeout(), Some(Duration::from_secs(60)));
        assert_eq!(settings.output, OutputMode::Text);
        assert!(settings.api_token.is_none());
    }

    #[test]
    fn given_zero_timeout_when_asking_deadline_then_none() {
        let settings = Settings {
            timeout_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.timeout(), None);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_unspecified_fields_kept() {
        let base = Settings::default();
        let overlay = RawSettings {
            api_url: Some("https://api.mail.test".into()),
            output: Some(OutputMode::Json),
            ..RawSettings::default()
        };

        let merged = base.merge_with(&overlay);

        assert_eq!(merged.api_url, "https://api.mail.test");
        assert_eq!(merged.output, OutputMode::Json);
        assert_eq!(merged.timeout_secs, base.timeout_secs);
    }

    #[test]
    fn given_token_when_showing_config_then_masked() {
        let settings = Settings {
            api_token: Some("secret-token".into()),
            ..Settings::default()
        };

        let shown = settings.to_toml().unwrap();

        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn given_output_strings_when_parsing_then_case_insensitive() {
        assert_eq!(parse_output("JSON").unwrap(), OutputMode::Json);
        assert!(parse_output("yaml").is_err());
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.api_url.is_none());
    }
}
