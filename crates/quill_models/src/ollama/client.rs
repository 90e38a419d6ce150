use super::dto::{ChatOptions, ChatRequest, ChatResponse};
use crate::http::{build_client, decode_error, rejection, send_error, trim_base};
use crate::ProviderConfig;
use async_trait::async_trait;
use quill_core::{
    estimate_tokens, GenerateParams, GenerationResult, Message, ProviderCapabilities,
};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult};
use quill_interface::Provider;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument};

const PROVIDER: &str = "ollama";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Creates a new Ollama provider.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server root (e.g., "http://localhost:11434")
    /// * `model` - Model tag (e.g., "qwen2.5:7b")
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        let base_url = trim_base(&base_url.into());
        let model = model.into();
        if model.trim().is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::InvalidConfiguration(
                "ollama provider requires a model".to_string(),
            )));
        }
        debug!(%base_url, %model, "Creating Ollama provider");
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            base_url,
            model,
        })
    }

    /// Creates a provider from configuration, applying defaults.
    pub fn from_config(config: &ProviderConfig) -> ProviderResult<Self> {
        Self::new(
            config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            config.model.clone(),
            config
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        )
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    #[instrument(skip(self, messages, params), fields(model = %self.model))]
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        let start = Instant::now();
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            format: params.json_mode.then_some("json"),
            options: ChatOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
                top_p: params.top_p,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(rejection(PROVIDER, response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| decode_error(PROVIDER, e))?;

        if let Some(message) = body.error.filter(|m| !m.is_empty()) {
            error!(error = %message, "Ollama reported an error");
            return Err(ProviderError::generation_failed(PROVIDER, message));
        }

        let text = body.message.map(|m| m.content).unwrap_or_default();
        let prompt_tokens = body.prompt_eval_count.unwrap_or_else(|| {
            messages
                .iter()
                .map(|m| estimate_tokens(&m.content))
                .sum()
        });
        let completion_tokens = body
            .eval_count
            .unwrap_or_else(|| estimate_tokens(&text));

        debug!(prompt_tokens, completion_tokens, "Received Ollama response");
        Ok(GenerationResult {
            text,
            prompt_tokens,
            completion_tokens,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(32_768)
            .with_json_mode(true)
            .with_thinking(true)
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> ProviderResult<()> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| {
                ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                    provider: PROVIDER.to_string(),
                    message: e.to_string(),
                })
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                provider: PROVIDER.to_string(),
                message: format!("server returned {}", response.status()),
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
