//! Committer: folds a finished scene into memory.

use super::{truncate_chars, AgentBase};
use crate::commit::CommitJob;
use crate::extraction::parse_string_list;
use quill_core::{GenerateParams, Message};
use quill_error::{SwarmError, SwarmErrorKind, SwarmResult};
use quill_interface::{MemoryStore, SceneRecord};
use quill_models::AgentConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Characters of scene text shown to the fact extractor.
pub const FACT_TEXT_LIMIT: usize = 2000;

/// Upper bound on facts taken from the extractor.
pub const MAX_EXTRACTED_FACTS: usize = 5;

const SUMMARY_SENTENCES: usize = 3;
const SUMMARY_CHARS: usize = 300;

const FACT_PROMPT: &str = "List the concrete story facts this scene establishes \
(names, places, relationships, objects, events) as a JSON array of short strings. \
Respond with JSON only.";

/// Writes scene records to a [`MemoryStore`].
#[derive(Clone)]
pub struct CommitterAgent {
    base: AgentBase,
    store: Arc<dyn MemoryStore>,
    llm_fact_extraction: bool,
}

impl CommitterAgent {
    /// Bind the Committer to its provider and store.
    pub fn new(config: &AgentConfig, store: Arc<dyn MemoryStore>, llm_fact_extraction: bool) -> Self {
        Self {
            base: AgentBase::from_config(config),
            store,
            llm_fact_extraction,
        }
    }

    /// Sampling parameters for fact extraction.
    pub fn params() -> GenerateParams {
        GenerateParams::new(0.2, 1000).with_json_mode()
    }

    /// Build the record for `job` and write it to the store.
    ///
    /// # Errors
    ///
    /// Returns `CommitFailed` when the store rejects the record.
    pub async fn commit(&self, job: CommitJob) -> SwarmResult<()> {
        let facts = if self.llm_fact_extraction {
            self.extract_facts(&job).await
        } else {
            job.scene_spec.continuity.facts_to_reinforce.clone()
        };

        let record = build_record(&job, facts);
        debug!(scene_id = %job.scene_id, summary_len = record.summary().len(), "Built scene record");

        self.store
            .commit_scene(record)
            .await
            .map_err(|e| SwarmError::new(SwarmErrorKind::CommitFailed(e.to_string())))?;

        info!(scene_id = %job.scene_id, chapter = job.chapter, scene = job.scene, "Scene committed to memory");
        Ok(())
    }

    /// Ask the provider for facts, falling back to the design's list.
    async fn extract_facts(&self, job: &CommitJob) -> Vec<String> {
        let messages = [
            Message::system(FACT_PROMPT),
            Message::user(truncate_chars(&job.text, FACT_TEXT_LIMIT)),
        ];

        let extracted = match self.base.generate(&messages, &Self::params()).await {
            Ok(result) => parse_string_list(&result.text),
            Err(_) => None,
        };

        match extracted {
            Some(mut facts) => {
                facts.retain(|f| !f.trim().is_empty());
                facts.truncate(MAX_EXTRACTED_FACTS);
                facts
            }
            None => {
                warn!(scene_id = %job.scene_id, "Fact extraction failed, keeping designed facts");
                job.scene_spec.continuity.facts_to_reinforce.clone()
            }
        }
    }
}

fn build_record(job: &CommitJob, facts: Vec<String>) -> SceneRecord {
    let spec = &job.scene_spec;
    let pov = Some(spec.constraints.pov_character.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    SceneRecord::new(job.scene_id.clone(), job.chapter, job.scene)
        .with_summary(summarize(&job.text))
        .with_pov_character(pov)
        .with_key_events(spec.narrative.key_events.clone())
        .with_facts(facts)
        .with_foreshadowing(
            spec.continuity.foreshadowing_to_resolve.clone(),
            spec.continuity.foreshadowing_to_plant.clone(),
        )
}

/// First sentences of `text`, capped in length.
fn summarize(text: &str) -> String {
    let text = text.trim();
    let mut end = text.len();
    let mut sentences = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !matches!(ch, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            sentences += 1;
            if sentences == SUMMARY_SENTENCES {
                end = idx + ch.len_utf8();
                break;
            }
        }
    }

    truncate_chars(&text[..end], SUMMARY_CHARS).trim_end().to_string()
}
