//! Application configuration
//!
//! Loaded from a TOML file with serde defaults for every field, so a missing
//! or partial file still yields a runnable configuration. API keys resolve
//! from the file first, then the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chat::DEFAULT_MAX_ROUNDS;
use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chat: ChatConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Load from a file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file; using defaults");
            Ok(Self::default())
        }
    }
}

/// Chat-completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Model identifier passed through to the provider
    pub model: String,
    /// API key set directly in the file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Environment variable to read the API key from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Cap on tool-call rounds per chat run
    pub max_rounds: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_key: None,
            api_key_env: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl ChatConfig {
    /// Resolve the API key: direct value, then the named env var, then the
    /// conventional env var for the configured model's provider.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }

        if let Some(env_name) = &self.api_key_env {
            if let Ok(key) = std::env::var(env_name) {
                if !key.is_empty() {
                    return Some(key);
                }
            }
        }

        let fallback = if self.model.starts_with("claude") {
            "ANTHROPIC_API_KEY"
        } else if self.model.starts_with("gemini") {
            "GEMINI_API_KEY"
        } else {
            "OPENAI_API_KEY"
        };
        std::env::var(fallback).ok().filter(|k| !k.is_empty())
    }

    /// Whether a completion backend can be constructed at all
    pub fn is_configured(&self) -> bool {
        self.resolve_api_key().is_some()
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chat.model, "gpt-4o");
        assert_eq!(config.chat.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(config.server.bind_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chat]
            model = "claude-sonnet-4-20250514"
            max_rounds = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.chat.model, "claude-sonnet-4-20250514");
        assert_eq!(config.chat.max_rounds, 4);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_direct_api_key_wins() {
        let chat = ChatConfig {
            api_key: Some("sk-direct".to_string()),
            api_key_env: Some("TALLY_TEST_UNSET_KEY".to_string()),
            ..ChatConfig::default()
        };
        assert_eq!(chat.resolve_api_key(), Some("sk-direct".to_string()));
    }

    #[test]
    fn test_api_key_from_named_env() {
        let chat = ChatConfig {
            api_key_env: Some("TALLY_TEST_API_KEY_91824".to_string()),
            ..ChatConfig::default()
        };

        // set_var is unsafe in edition 2024; the var name is test-unique
        unsafe { std::env::set_var("TALLY_TEST_API_KEY_91824", "sk-env") };
        assert_eq!(chat.resolve_api_key(), Some("sk-env".to_string()));
        unsafe { std::env::remove_var("TALLY_TEST_API_KEY_91824") };
    }

    #[test]
    fn test_round_trip_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[chat]"));
        assert!(toml_str.contains("[server]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.chat.model, config.chat.model);
        assert_eq!(parsed.server.port, config.server.port);
    }
}
