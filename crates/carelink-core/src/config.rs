use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{CarelinkError, Result};

/// Top-level configuration for the Carelink backend.
///
/// Loaded from `~/.carelink/config.toml` by default. Each section covers one
/// bounded context or cross-cutting concern. Secrets (the provider API key)
/// are normally injected through the environment rather than the file; see
/// [`CarelinkConfig::apply_env_overrides`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarelinkConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Default for CarelinkConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

impl CarelinkConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: CarelinkConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CarelinkError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Apply environment-variable overrides on top of file values.
    ///
    /// Recognized variables: `CARELINK_API_KEY`, `CARELINK_BASE_URL`,
    /// `CARELINK_MODEL`. The API key in particular should never live in the
    /// config file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("CARELINK_API_KEY") {
            if !key.trim().is_empty() {
                self.provider.api_key = key;
            }
        }
        if let Ok(url) = std::env::var("CARELINK_BASE_URL") {
            if !url.trim().is_empty() {
                self.provider.base_url = url;
            }
        }
        if let Ok(model) = std::env::var("CARELINK_MODEL") {
            if !model.trim().is_empty() {
                self.provider.model = model;
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.carelink/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// LLM provider settings.
///
/// The provider is any OpenAI-compatible chat-completions endpoint; identity
/// and model are configuration, not code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the completions API, without the `/chat/completions` path.
    pub base_url: String,
    /// Bearer token for the provider. Prefer `CARELINK_API_KEY`.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Chat pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Intent classifier policy: "keyword" or "llm".
    pub classifier_policy: String,
    /// Sampling temperature for answer generation.
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            classifier_policy: "keyword".to_string(),
            temperature: 0.3,
        }
    }
}
