//! Anthropic API key resolution.
//!
//! The key is resolved from sources in priority order:
//!
//! 1. **Env var** - `ANTHROPIC_API_KEY`
//! 2. **Secrets file** - `~/.config/invocr/secrets.toml` with an
//!    `ANTHROPIC_API_KEY` entry
//!
//! A missing key is a configuration error raised before any agent call is
//! attempted, never a pipeline error.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::ConfigError;

pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(rename = "ANTHROPIC_API_KEY")]
    anthropic_api_key: Option<String>,
}

/// Default location of the secrets file.
pub fn default_secrets_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invocr")
        .join("secrets.toml")
}

/// Resolves the Anthropic API key from the environment or the default
/// secrets file.
pub fn anthropic_api_key() -> Result<SecretString, ConfigError> {
    let env_value = std::env::var(API_KEY_ENV_VAR).ok();
    resolve_api_key(env_value, &default_secrets_path())
}

fn resolve_api_key(
    env_value: Option<String>,
    secrets_path: &Path,
) -> Result<SecretString, ConfigError> {
    if let Some(key) = env_value {
        let trimmed = key.trim();
        if !trimmed.is_empty() {
            return Ok(SecretString::from(trimmed.to_string()));
        }
    }

    if secrets_path.exists() {
        let content =
            std::fs::read_to_string(secrets_path).map_err(|e| ConfigError::ReadSecrets {
                path: secrets_path.to_path_buf(),
                source: e,
            })?;
        let parsed: SecretsFile =
            toml::from_str(&content).map_err(|e| ConfigError::ParseSecrets {
                path: secrets_path.to_path_buf(),
                source: e,
            })?;
        if let Some(key) = parsed.anthropic_api_key {
            let trimmed = key.trim();
            if !trimmed.is_empty() {
                return Ok(SecretString::from(trimmed.to_string()));
            }
        }
    }

    Err(ConfigError::MissingApiKey {
        secrets_path: secrets_path.display().to_string(),
    })
}
