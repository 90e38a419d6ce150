use super::dto::{AnthropicMessage, AnthropicRequest, AnthropicResponse};
use crate::http::{build_client, decode_error, rejection, send_error, trim_base};
use crate::ProviderConfig;
use async_trait::async_trait;
use quill_core::{
    estimate_tokens, GenerateParams, GenerationResult, Message, ProviderCapabilities, Role,
};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use quill_interface::Provider;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

const PROVIDER: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root without the `/v1` path
    /// * `api_key` - Anthropic API key
    /// * `model` - Model identifier
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let base_url = trim_base(&base_url.into());
        let model = model.into();
        debug!(%base_url, %model, "Creating Anthropic provider");
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            base_url,
            api_key: api_key.into(),
            model,
        })
    }

    /// Creates a provider from configuration.
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured inline or in the environment.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        let api_key = config.resolve_api_key(DEFAULT_API_KEY_ENV).ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::InvalidConfiguration(format!(
                "anthropic provider requires an API key (set {})",
                config.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
            )))
        })?;
        let model = if config.model.trim().is_empty() {
            DEFAULT_MODEL.to_string()
        } else {
            config.model.clone()
        };
        Self::new(
            config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            api_key,
            model,
            config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        )
    }

    /// Moves system messages into the top-level `system` field.
    fn convert_request(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<AnthropicRequest> {
        let system: Vec<&str> = messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let turns: Vec<AnthropicMessage> = messages
            .iter()
            .filter_map(|m| match m.role {
                Role::System => None,
                Role::User => Some(AnthropicMessage {
                    role: "user",
                    content: m.content.clone(),
                }),
                Role::Assistant => Some(AnthropicMessage {
                    role: "assistant",
                    content: m.content.clone(),
                }),
            })
            .collect();

        let mut builder = AnthropicRequest::builder();
        builder
            .model(self.model.clone())
            .max_tokens(params.max_tokens)
            .messages(turns)
            .temperature(params.temperature);
        if !system.is_empty() {
            builder.system(system.join("\n\n"));
        }
        if let Some(top_p) = params.top_p {
            builder.top_p(top_p);
        }

        builder.build().map_err(|e| {
            ProviderError::generation_failed(PROVIDER, format!("invalid request: {e}"))
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    #[instrument(skip(self, messages, params), fields(model = %self.model))]
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        let start = Instant::now();
        let request = self.convert_request(messages, params)?;

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(rejection(PROVIDER, response).await);
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e))?;

        let text: String = body
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        let (prompt_tokens, completion_tokens) = match body.usage {
            Some(usage) => (usage.input_tokens, usage.output_tokens),
            None => (
                messages.iter().map(|m| estimate_tokens(&m.content)).sum(),
                estimate_tokens(&text),
            ),
        };

        debug!(prompt_tokens, completion_tokens, "Received Anthropic response");
        Ok(GenerationResult {
            text,
            prompt_tokens,
            completion_tokens,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(200_000)
            .with_tool_use(true)
            .with_thinking(true)
            .with_streaming(true)
    }

    /// A 404 from the models endpoint still proves the API is reachable.
    #[instrument(skip(self))]
    async fn health_check(&self) -> ProviderResult<()> {
        let response = self
            .client
            .get(format!("{}/v1/models", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                    provider: PROVIDER.to_string(),
                    message: e.to_string(),
                })
            })?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                provider: PROVIDER.to_string(),
                message: format!("server returned {status}"),
            }))
        }
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
