//! Provider construction and per-agent routing.

use crate::{
    AnthropicProvider, MockProvider, OllamaProvider, OpenAiProvider, ProviderConfig,
    ProviderSection,
};
use derive_getters::Getters;
use quill_core::{AgentRole, ProviderCapabilities};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use quill_interface::Provider;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, warn};

/// Constructor for one provider type.
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> ProviderResult<Arc<dyn Provider>> + Send + Sync>;

/// Maps lowercase type names to provider constructors.
///
/// Built once at start-up and passed to whatever needs to create providers.
///
/// # Examples
///
/// ```
/// use quill_models::{ProviderConfig, ProviderRegistry};
///
/// let registry = ProviderRegistry::with_defaults();
/// let provider = registry.create_provider(&ProviderConfig::mock()).unwrap();
/// assert_eq!(provider.name(), "mock");
///
/// let bogus = ProviderConfig { provider_type: "bogus".into(), ..Default::default() };
/// assert!(registry.create_provider(&bogus).is_err());
/// ```
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled backends: mock, ollama, openai, anthropic.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mock", |config| {
            Ok(Arc::new(MockProvider::from_config(config)) as Arc<dyn Provider>)
        });
        registry.register("ollama", |config| {
            Ok(Arc::new(OllamaProvider::from_config(config)?) as Arc<dyn Provider>)
        });
        registry.register("openai", |config| {
            Ok(Arc::new(OpenAiProvider::from_config(config)?) as Arc<dyn Provider>)
        });
        registry.register("anthropic", |config| {
            Ok(Arc::new(AnthropicProvider::from_config(config)?) as Arc<dyn Provider>)
        });
        registry
    }

    /// Register or replace the constructor for `type_name`.
    pub fn register<F>(&mut self, type_name: &str, factory: F)
    where
        F: Fn(&ProviderConfig) -> ProviderResult<Arc<dyn Provider>> + Send + Sync + 'static,
    {
        self.factories
            .insert(type_name.trim().to_lowercase(), Arc::new(factory));
    }

    /// Whether a constructor exists for `type_name`.
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.factories
            .contains_key(&type_name.trim().to_lowercase())
    }

    /// Registered type names, sorted.
    pub fn registered_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Construct a provider for `config`.
    ///
    /// # Errors
    ///
    /// Returns `UnregisteredProviderType` when no constructor matches, or
    /// whatever the constructor reports.
    #[instrument(skip(self, config), fields(provider_type = %config.provider_type))]
    pub fn create_provider(&self, config: &ProviderConfig) -> ProviderResult<Arc<dyn Provider>> {
        let type_name = config.provider_type.trim().to_lowercase();
        let factory = self.factories.get(&type_name).ok_or_else(|| {
            warn!("Provider type not registered");
            ProviderError::new(ProviderErrorKind::UnregisteredProviderType(
                config.provider_type.clone(),
            ))
        })?;
        factory(config)
    }

    /// Wire one provider per agent role.
    ///
    /// Each role uses its explicit route, else the section default. A name
    /// with no definition (or no name at all) falls back to the mock
    /// provider. A defined provider with an empty type is an error.
    ///
    /// # Errors
    ///
    /// Returns `MissingProviderType` for a typeless definition, or any
    /// construction error of a routed provider.
    #[instrument(skip(self, section), fields(default = %section.default))]
    pub fn build_agent_configs(&self, section: &ProviderSection) -> ProviderResult<AgentConfigs> {
        for route in section.routing.keys() {
            if route.parse::<AgentRole>().is_err() {
                warn!(route = %route, "Ignoring route for unknown agent role");
            }
        }

        let build = |role: AgentRole| -> ProviderResult<AgentConfig> {
            let name = section.provider_name_for(role).trim();
            let (provider_name, config) = match section.available.get(name) {
                Some(config) if !name.is_empty() => (name.to_string(), config.clone()),
                _ => {
                    debug!(%role, requested = name, "No provider configured, using mock");
                    ("mock".to_string(), ProviderConfig::mock())
                }
            };

            if config.provider_type.trim().is_empty() {
                return Err(ProviderError::new(ProviderErrorKind::MissingProviderType(
                    provider_name,
                )));
            }

            let provider = self.create_provider(&config)?;
            let capabilities = provider.capabilities();
            info!(
                %role,
                provider = %provider_name,
                backend = provider.name(),
                model = provider.model_name(),
                context_length = *capabilities.context_length(),
                json_mode = *capabilities.json_mode(),
                "Agent provider configured"
            );

            Ok(AgentConfig {
                role,
                provider_name,
                provider,
                capabilities,
            })
        };

        Ok(AgentConfigs {
            director: build(AgentRole::Director)?,
            writer: build(AgentRole::Writer)?,
            checker: build(AgentRole::Checker)?,
            editor: build(AgentRole::Editor)?,
            committer: build(AgentRole::Committer)?,
        })
    }
}

/// The provider bound to one agent role.
#[derive(Clone, Getters)]
pub struct AgentConfig {
    /// Role served
    role: AgentRole,
    /// Configured provider name (or "mock" for the fallback)
    provider_name: String,
    /// Provider instance
    provider: Arc<dyn Provider>,
    /// Capabilities queried at wiring time
    capabilities: ProviderCapabilities,
}

impl AgentConfig {
    /// Bind an already constructed provider to a role.
    pub fn new(role: AgentRole, provider_name: impl Into<String>, provider: Arc<dyn Provider>) -> Self {
        let capabilities = provider.capabilities();
        Self {
            role,
            provider_name: provider_name.into(),
            provider,
            capabilities,
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("role", &self.role)
            .field("provider_name", &self.provider_name)
            .field("backend", &self.provider.name())
            .field("model", &self.provider.model_name())
            .finish()
    }
}

/// One [`AgentConfig`] per pipeline role.
#[derive(Debug, Clone)]
pub struct AgentConfigs {
    /// Director binding
    pub director: AgentConfig,
    /// Writer binding
    pub writer: AgentConfig,
    /// Checker binding
    pub checker: AgentConfig,
    /// Editor binding
    pub editor: AgentConfig,
    /// Committer binding
    pub committer: AgentConfig,
}

impl AgentConfigs {
    /// Bind every role to the same provider.
    pub fn uniform(provider_name: &str, provider: Arc<dyn Provider>) -> Self {
        let bind = |role| AgentConfig::new(role, provider_name, Arc::clone(&provider));
        Self {
            director: bind(AgentRole::Director),
            writer: bind(AgentRole::Writer),
            checker: bind(AgentRole::Checker),
            editor: bind(AgentRole::Editor),
            committer: bind(AgentRole::Committer),
        }
    }

    /// Binding for `role`.
    pub fn get(&self, role: AgentRole) -> &AgentConfig {
        match role {
            AgentRole::Director => &self.director,
            AgentRole::Writer => &self.writer,
            AgentRole::Checker => &self.checker,
            AgentRole::Editor => &self.editor,
            AgentRole::Committer => &self.committer,
        }
    }

    /// Bindings in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentConfig> {
        AgentRole::iter().map(|role| self.get(role))
    }
}
