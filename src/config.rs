//! Configuration loader and validator for the update notifier.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub mail: Mail,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    /// Database source name shown in notification messages.
    pub source: String,
    pub data_dir: String,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mail {
    /// When false, messages are logged instead of spooled.
    pub enabled: bool,
    pub from: String,
    pub spool_dir: String,
}

impl Config {
    /// Ensure required directories exist (`app.data_dir`, and `mail.spool_dir`
    /// when mail is enabled).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if !self.app.data_dir.trim().is_empty() {
            fs::create_dir_all(&self.app.data_dir)?;
        }
        if self.mail.enabled && !self.mail.spool_dir.trim().is_empty() {
            fs::create_dir_all(&self.mail.spool_dir)?;
        }
        Ok(())
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.source.trim().is_empty() {
        return Err(ConfigError::Invalid("app.source must be non-empty"));
    }
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if cfg.mail.from.trim().is_empty() {
        return Err(ConfigError::Invalid("mail.from must be non-empty"));
    }
    if cfg.mail.enabled && cfg.mail.spool_dir.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "mail.spool_dir must be non-empty when mail is enabled",
        ));
    }

    Ok(())
}

/// Sample configuration.
pub fn example() -> &'static str {
    r#"app:
  source: "TEST"
  data_dir: "./data"

mail:
  # false: log outgoing notifications instead of spooling them
  enabled: false
  from: "Database Notifications <notify@example.net>"
  spool_dir: "./data/spool"
"#
}
