//! Provider configuration.
//!
//! The provider section is read from TOML with this precedence
//! (later sources override earlier):
//! 1. `~/.config/quill/quill.toml`
//! 2. `./quill.toml`
//!
//! An explicit path replaces both. A missing file yields an empty section,
//! which routes every agent to the mock provider.

use config::{Config, File, FileFormat};
use quill_core::AgentRole;
use quill_error::{ConfigError, QuillError, QuillResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Configuration for one named provider.
///
/// # Example
///
/// ```toml
/// [provider.available.local_ollama]
/// type = "ollama"
/// model = "qwen2.5:7b"
/// base_url = "http://localhost:11434"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct ProviderConfig {
    /// Backend type name (e.g., "ollama", "openai", "anthropic", "mock")
    #[serde(rename = "type", default)]
    pub provider_type: String,

    /// Model identifier
    #[serde(default)]
    pub model: String,

    /// Override for the backend base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub base_url: Option<String>,

    /// API key given inline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub api_key: Option<String>,

    /// Environment variable holding the API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option))]
    pub timeout_secs: Option<u64>,

    /// Seed for the mock provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(strip_option))]
    pub seed: Option<u64>,
}

impl ProviderConfig {
    /// Configuration for the mock provider.
    pub fn mock() -> Self {
        Self {
            provider_type: "mock".to_string(),
            ..Self::default()
        }
    }

    /// Resolve the API key: inline value first, then the named environment variable.
    pub fn resolve_api_key(&self, default_env: &str) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Some(key.clone());
        }
        let var = self.api_key_env.as_deref().unwrap_or(default_env);
        std::env::var(var).ok().filter(|k| !k.trim().is_empty())
    }
}

/// Provider definitions and per-agent routing.
///
/// # Example
///
/// ```toml
/// [provider]
/// default = "local_ollama"
///
/// [provider.routing]
/// director = "cloud"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// Provider used by roles without a route
    pub default: String,
    /// Named provider definitions
    pub available: HashMap<String, ProviderConfig>,
    /// Role name to provider name
    pub routing: HashMap<String, String>,
}

impl ProviderSection {
    /// Provider name routed to `role`, falling back to the default.
    pub fn provider_name_for(&self, role: AgentRole) -> &str {
        self.routing
            .get(role.as_ref())
            .map(String::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.default.as_str())
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuillConfig {
    /// Provider section
    #[serde(default)]
    pub provider: ProviderSection,
}

impl QuillConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> QuillResult<Self> {
        debug!("Loading configuration from file");

        Self::deserialize(
            Config::builder().add_source(File::from(path.as_ref()).format(FileFormat::Toml)),
        )
    }

    /// Load configuration with precedence: current dir > home dir.
    ///
    /// Both files are optional.
    #[instrument]
    pub fn load() -> QuillResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir");

        let mut builder = Config::builder();
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/quill/quill.toml");
            builder = builder.add_source(
                File::from(home_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }
        builder = builder.add_source(File::new("quill.toml", FileFormat::Toml).required(false));

        Self::deserialize(builder)
    }

    /// Load from `path` when given, otherwise search the default locations.
    pub fn load_from(path: Option<&Path>) -> QuillResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    fn deserialize(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> QuillResult<Self> {
        builder
            .build()
            .map_err(|e| {
                QuillError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                QuillError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
