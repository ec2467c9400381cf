//! Hearth configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main Hearth configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HearthConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Model backend configuration
    #[serde(default)]
    pub model: ModelConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Context synthesis configuration
    #[serde(default)]
    pub context: ContextConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins (empty = allow any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// Model backend configuration
///
/// Targets any OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the chat-completions API
    pub base_url: String,

    /// API key. Empty means "read from the environment at startup"
    /// (see [`ModelConfig::API_KEY_ENV`]).
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Maximum completion tokens per response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,
}

impl ModelConfig {
    /// Environment variable consulted when `api_key` is empty
    pub const API_KEY_ENV: &'static str = "HEARTH_MODEL_API_KEY";

    /// Resolve the effective API key: config value first, environment second.
    pub fn resolve_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(Self::API_KEY_ENV).ok().filter(|k| !k.is_empty())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mistral.ai/v1".to_string(),
            api_key: String::new(),
            model: "mistral-medium-latest".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            request_timeout_secs: 30,
            max_retries: 2,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for profiles and sessions
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Default data directory (~/.hearth/user_data)
    pub fn default_data_dir() -> PathBuf {
        dirs_next::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hearth")
            .join("user_data")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }
}

/// Context synthesis configuration
///
/// Caps on what gets folded into the system prompt each turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// How many recent sessions to scan
    pub recent_sessions: usize,

    /// Max distinct topics surfaced
    pub max_topics: usize,

    /// Max distinct mood indicators surfaced
    pub max_moods: usize,

    /// Max prior advice snippets surfaced
    pub max_advice: usize,

    /// Max follow-up notes surfaced
    pub max_follow_ups: usize,

    /// Raw message history window sent to the model
    pub history_window: usize,

    /// Capacity of the in-memory session cache
    pub session_cache_capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            recent_sessions: 3,
            max_topics: 5,
            max_moods: 5,
            max_advice: 3,
            max_follow_ups: 3,
            history_window: 10,
            session_cache_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HearthConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.model.model, "mistral-medium-latest");
        assert_eq!(config.model.max_tokens, 500);
        assert_eq!(config.context.recent_sessions, 3);
        assert_eq!(config.context.max_topics, 5);
        assert_eq!(config.context.max_advice, 3);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = HearthConfig::default();
        let toml = toml::to_string(&config).unwrap();
        let parsed: HearthConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.server.port, config.server.port);
        assert_eq!(parsed.model.base_url, config.model.base_url);
        assert_eq!(parsed.context.history_window, config.context.history_window);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: HearthConfig = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000
            cors_origins = []
            "#,
        )
        .unwrap();
        assert_eq!(parsed.server.port, 9000);
        // Unspecified sections fall back to defaults
        assert_eq!(parsed.model.model, "mistral-medium-latest");
        assert_eq!(parsed.context.max_moods, 5);
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let mut model = ModelConfig::default();
        model.api_key = "sk-test".to_string();
        assert_eq!(model.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
