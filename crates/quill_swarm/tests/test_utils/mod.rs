//! Test utilities for swarm tests.
//!
//! Scripted providers replay queued outputs so each pipeline stage can be
//! driven independently.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use quill_core::{
    AgentRole, GenerateParams, GenerationResult, Message, ProviderCapabilities, SceneRequest,
};
use quill_error::{ProviderError, ProviderErrorKind, ProviderResult, QuillResult};
use quill_interface::{MemoryStore, Provider, SceneRecord};
use quill_models::{AgentConfig, AgentConfigs};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A single scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this text
    Success(String),
    /// Fail with this error
    Error(ProviderErrorKind),
}

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub params: GenerateParams,
}

/// Provider that replays queued responses and records every call.
///
/// Once the queue is empty it repeats the fallback text.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    fallback: String,
    calls: Mutex<Vec<RecordedCall>>,
    delay: Option<Duration>,
    health: Result<(), String>,
}

impl ScriptedProvider {
    /// Always answer with `text`.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: text.into(),
            calls: Mutex::new(Vec::new()),
            delay: None,
            health: Ok(()),
        }
    }

    /// Always fail with `kind`.
    pub fn failing(kind: ProviderErrorKind) -> Self {
        let provider = Self::always("");
        provider.push(MockResponse::Error(kind));
        provider
    }

    /// Queue a response ahead of the fallback.
    pub fn push(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    /// Sleep before answering and before health checks.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make health checks fail with `message`.
    pub fn unhealthy(mut self, message: impl Into<String>) -> Self {
        self.health = Err(message.into());
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Content of the last user message of call `index`.
    pub fn user_prompt(&self, index: usize) -> Option<String> {
        self.calls
            .lock()
            .get(index)
            .and_then(|call| call.messages.last())
            .map(|m| m.content.clone())
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(
        &self,
        messages: &[Message],
        params: &GenerateParams,
    ) -> ProviderResult<GenerationResult> {
        self.calls.lock().push(RecordedCall {
            messages: messages.to_vec(),
            params: *params,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.lock().pop_front();
        match next {
            Some(MockResponse::Error(kind)) => Err(ProviderError::new(kind)),
            Some(MockResponse::Success(text)) => Ok(result(text)),
            None => Ok(result(self.fallback.clone())),
        }
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new(4096).with_json_mode(true)
    }

    async fn health_check(&self) -> ProviderResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.health.clone().map_err(|message| {
            ProviderError::new(ProviderErrorKind::HealthCheckFailed {
                provider: "scripted".into(),
                message,
            })
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

fn result(text: String) -> GenerationResult {
    GenerationResult {
        text,
        prompt_tokens: 10,
        completion_tokens: 20,
        duration_ms: 5,
    }
}

/// One scripted provider per role.
pub struct Script {
    pub director: Arc<ScriptedProvider>,
    pub writer: Arc<ScriptedProvider>,
    pub checker: Arc<ScriptedProvider>,
    pub editor: Arc<ScriptedProvider>,
    pub committer: Arc<ScriptedProvider>,
}

impl Script {
    /// A script where every stage succeeds and the Checker finds nothing.
    pub fn happy() -> Self {
        Self {
            director: Arc::new(ScriptedProvider::always(DESIGN_JSON)),
            writer: Arc::new(ScriptedProvider::always(DRAFT)),
            checker: Arc::new(ScriptedProvider::always("[]")),
            editor: Arc::new(ScriptedProvider::always(REVISION)),
            committer: Arc::new(ScriptedProvider::always(r#"["The vault is empty"]"#)),
        }
    }

    /// Bindings for a swarm.
    pub fn agents(&self) -> AgentConfigs {
        let bind = |role: AgentRole, provider: &Arc<ScriptedProvider>| {
            AgentConfig::new(role, role.to_string(), Arc::clone(provider) as Arc<dyn Provider>)
        };
        AgentConfigs {
            director: bind(AgentRole::Director, &self.director),
            writer: bind(AgentRole::Writer, &self.writer),
            checker: bind(AgentRole::Checker, &self.checker),
            editor: bind(AgentRole::Editor, &self.editor),
            committer: bind(AgentRole::Committer, &self.committer),
        }
    }
}

/// Store that sleeps before every write.
#[derive(Default)]
pub struct SlowStore {
    pub delay: Duration,
    pub records: Mutex<Vec<SceneRecord>>,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }
}

#[async_trait]
impl MemoryStore for SlowStore {
    async fn commit_scene(&self, record: SceneRecord) -> QuillResult<()> {
        tokio::time::sleep(self.delay).await;
        self.records.lock().push(record);
        Ok(())
    }
}

/// A validated request.
pub fn request(intention: &str) -> SceneRequest {
    SceneRequest {
        id: "scene-1".into(),
        intention: intention.into(),
        chapter: 3,
        scene: 2,
        word_count: 600,
        pov_character: "Mara".into(),
        mood: "tense".into(),
        required_events: vec!["The alarm trips".into()],
    }
}

pub const DESIGN_JSON: &str = r#"{
  "scene": {"id": "scene-1", "chapter": 3, "sequence_in_chapter": 2, "title": "The Vault"},
  "narrative": {"objective": "Crack the vault", "key_events": ["The alarm trips"]},
  "constraints": {"pov_character": "Mara", "location": "Bank basement"},
  "continuity": {
    "facts_to_reinforce": ["Mara is left-handed"],
    "foreshadowing_to_resolve": ["f-1"],
    "foreshadowing_to_plant": ["f-7"]
  }
}"#;

pub const DRAFT: &str = "Mara pressed her ear to the steel. The dial clicked. Somewhere above, a bell began to ring. She did not stop.";

pub const REVISION: &str = "Mara pressed her left ear to the steel. The dial clicked.";
