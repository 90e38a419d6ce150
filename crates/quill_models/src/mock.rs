//! Deterministic stand-in provider.

use crate::ProviderConfig;
use async_trait::async_trait;
use parking_lot::Mutex;
use quill_core::{GenerateParams, GenerationResult, Message, ProviderCapabilities};
use quill_error::ProviderResult;
use quill_interface::Provider;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;
use tracing::{debug, instrument};

/// Text returned for every non-JSON request.
pub const MOCK_RESPONSE: &str = "Mock response.";

const DEFAULT_SEED: u64 = 42;

const MOCK_SCENE_SPEC: &str = r#"{
  "scene": {"id": "mock-scene", "chapter": 1, "sequence_in_chapter": 1, "title": "Mock Scene"},
  "narrative": {
    "objective": "Exercise the pipeline without a backend",
    "summary": "A placeholder scene produced by the mock provider.",
    "key_events": ["The scene begins", "The scene ends"],
    "revelations": [],
    "hooks": []
  },
  "constraints": {"pov_character": "Narrator", "location": "Nowhere", "mood": "neutral", "characters_present": []},
  "continuity": {"facts_to_reinforce": [], "foreshadowing_to_resolve": [], "foreshadowing_to_plant": []}
}"#;

/// Provider that answers instantly with canned text.
///
/// Token counts come from a seeded generator, so two mocks built with the
/// same seed report identical usage for identical call sequences.
///
/// # Examples
///
/// ```
/// use quill_core::{GenerateParams, Message};
/// use quill_interface::Provider;
/// use quill_models::{MockProvider, MOCK_RESPONSE};
///
/// # tokio_test_block(async {
/// let mock = MockProvider::new(7);
/// let result = mock.generate(&[Message::user("hi")], &GenerateParams::default()).await.unwrap();
/// assert_eq!(result.text, MOCK_RESPONSE);
/// assert!((50..75).contains(&result.prompt_tokens));
/// # });
/// # fn tokio_test_block(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct MockProvider {
    model: String,
    rng: Mutex<StdRng>,
}

impl MockProvider {
    /// Create a mock with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            model: "mock".to_string(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Create a mock from configuration, honouring `seed` and `model`.
    pub fn from_config(config: &ProviderConfig) -> Self {
        let mut mock = Self::new(config.seed.unwrap_or(DEFAULT_SEED));
        if !config.model.trim().is_empty() {
            mock.model = config.model.clone();
        }
        mock
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[async_trait]
impl Provider for MockProvider {
    #[instrument(skip(self, messages, params), fields(json_mode = params.json_mode))]
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        let start = Instant::now();
        let text = if params.json_mode {
            MOCK_SCENE_SPEC
        } else {
            MOCK_RESPONSE
        };
        let (prompt_tokens, completion_tokens) = {
            let mut rng = self.rng.lock();
            (50 + rng.gen_range(0..25), 100 + rng.gen_range(0..50))
        };
        debug!(messages = messages.len(), "Mock generation");

        Ok(GenerationResult {
            text: text.to_string(),
            prompt_tokens,
            completion_tokens,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(8192).with_json_mode(true)
    }

    async fn health_check(&self) -> ProviderResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
