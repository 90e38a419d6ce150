//! The five-stage scene pipeline.

use crate::agents::{
    CheckInput, CheckerAgent, CommitterAgent, DirectorAgent, DraftInput, EditorAgent, ReviseInput,
    WriterAgent,
};
use crate::commit::{CommitJob, CommitQueue, DEFAULT_COMMIT_QUEUE_CAPACITY};
use crate::extraction::parse_scene_spec;
use crate::metrics::SwarmMetrics;
use quill_core::{SceneRequest, SceneResponse, Stage, StageInfo};
use quill_error::{SwarmError, SwarmErrorKind, SwarmResult};
use quill_interface::{DependencyHealth, MemoryStore};
use quill_models::AgentConfigs;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Tunables for a [`Swarm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmOptions {
    /// Commits that may wait for the background worker
    pub commit_queue_capacity: usize,
    /// Ask the Committer's provider for facts instead of using the design's list
    pub llm_fact_extraction: bool,
}

impl Default for SwarmOptions {
    fn default() -> Self {
        Self {
            commit_queue_capacity: DEFAULT_COMMIT_QUEUE_CAPACITY,
            llm_fact_extraction: false,
        }
    }
}

/// Runs Director, Writer, Checker, Editor and Committer in order.
pub struct Swarm {
    agents: AgentConfigs,
    director: DirectorAgent,
    writer: WriterAgent,
    checker: CheckerAgent,
    editor: EditorAgent,
    commits: CommitQueue,
}

impl Swarm {
    /// Build the pipeline and start its commit worker.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(agents: AgentConfigs, store: Arc<dyn MemoryStore>, options: SwarmOptions) -> Self {
        let committer = CommitterAgent::new(&agents.committer, store, options.llm_fact_extraction);
        let commits = CommitQueue::start(committer, options.commit_queue_capacity);

        for agent in agents.iter() {
            debug!(?agent, "Agent bound");
        }

        Self {
            director: DirectorAgent::new(&agents.director),
            writer: WriterAgent::new(&agents.writer),
            checker: CheckerAgent::new(&agents.checker),
            editor: EditorAgent::new(&agents.editor),
            agents,
            commits,
        }
    }

    /// The provider bindings this pipeline runs on.
    pub fn agents(&self) -> &AgentConfigs {
        &self.agents
    }

    /// Generate one scene.
    ///
    /// The request must already be validated. The commit stage is queued and
    /// does not appear in the returned trace.
    ///
    /// # Errors
    ///
    /// `DirectorFailed` or `WriterFailed` when those providers fail. Checker
    /// and Editor failures are absorbed.
    #[instrument(
        skip(self, request),
        fields(request_id = %request.id, chapter = request.chapter, scene = request.scene)
    )]
    pub async fn generate_scene(&self, request: &SceneRequest) -> SwarmResult<SceneResponse> {
        let started = Instant::now();
        let mut response = SceneResponse::start(&request.id);
        let metrics = SwarmMetrics::get();
        info!("Starting scene pipeline");

        // Design
        let design = self.director.design(request).await.map_err(|e| {
            metrics.record_run("aborted", elapsed_ms(started));
            error!(error = %e, "Director failed, aborting pipeline");
            SwarmError::new(SwarmErrorKind::DirectorFailed(e))
        })?;
        let (spec, source) = parse_scene_spec(&design.text);
        metrics.record_design_source(source.as_str());
        push_stage(&mut response, StageInfo::completed(Stage::Design, &design));
        debug!(source = source.as_str(), title = %spec.scene.title, "Scene designed");

        // Draft
        let draft = self
            .writer
            .draft(DraftInput {
                spec: &spec,
                word_count: request.word_count,
                pov_character: &request.pov_character,
                intention: &request.intention,
            })
            .await
            .map_err(|e| {
                metrics.record_run("aborted", elapsed_ms(started));
                error!(error = %e, "Writer failed, aborting pipeline");
                SwarmError::new(SwarmErrorKind::WriterFailed(e))
            })?;
        push_stage(&mut response, StageInfo::completed(Stage::Draft, &draft));
        let mut text = draft.text;

        // Validate
        let check_started = Instant::now();
        let check = self
            .checker
            .check(CheckInput {
                text: &text,
                chapter: request.chapter,
                scene: request.scene,
                pov_character: &request.pov_character,
            })
            .await;
        let issues = match check {
            Ok((result, issues)) => {
                push_stage(&mut response, StageInfo::completed(Stage::Validate, &result));
                issues
            }
            Err(e) => {
                let degraded = SwarmError::new(SwarmErrorKind::CheckerDegraded(e.kind.to_string()));
                warn!(error = %degraded, "Checker failed, continuing with no issues");
                metrics.record_degraded(Stage::Validate.operation());
                push_stage(
                    &mut response,
                    StageInfo::attempted(Stage::Validate, elapsed_ms(check_started)),
                );
                Vec::new()
            }
        };

        // Revise, at most once
        if !issues.is_empty() {
            debug!(issue_count = issues.len(), "Revising draft");
            let revise_started = Instant::now();
            match self
                .editor
                .revise(ReviseInput {
                    text: &text,
                    issues: &issues,
                })
                .await
            {
                Ok(revision) => {
                    push_stage(&mut response, StageInfo::completed(Stage::Revise, &revision));
                    if revision.text.trim().is_empty() {
                        warn!("Editor returned empty text, keeping draft");
                        metrics.record_degraded(Stage::Revise.operation());
                    } else {
                        text = revision.text;
                        response.revision_made = true;
                        metrics.record_revision();
                    }
                }
                Err(e) => {
                    let degraded = SwarmError::new(SwarmErrorKind::EditorDegraded(e.kind.to_string()));
                    warn!(error = %degraded, "Editor failed, keeping draft");
                    metrics.record_degraded(Stage::Revise.operation());
                    push_stage(
                        &mut response,
                        StageInfo::attempted(Stage::Revise, elapsed_ms(revise_started)),
                    );
                }
            }
        }

        // Commit, off the response path. Failures are logged by the queue.
        let _ = self.commits.submit(CommitJob {
            scene_id: request.id.clone(),
            chapter: request.chapter,
            scene: request.scene,
            text: text.clone(),
            scene_spec: spec.clone(),
        });

        response.scenespec = Some(spec);
        response.issues = issues;
        response.text = text;
        response.total_duration_ms = elapsed_ms(started);
        metrics.record_run("completed", response.total_duration_ms);

        info!(
            total_duration_ms = response.total_duration_ms,
            stages = response.stages.len(),
            issues = response.issues.len(),
            revision_made = response.revision_made,
            "Scene pipeline completed"
        );
        Ok(response)
    }

    /// Probe every role's provider concurrently.
    ///
    /// Each probe is bounded by `timeout`.
    pub async fn provider_health(&self, timeout: Duration) -> Vec<DependencyHealth> {
        let probes = self.agents.iter().map(|agent| async move {
            let error = match tokio::time::timeout(timeout, agent.provider().health_check()).await
            {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.kind.to_string()),
                Err(_) => Some(format!(
                    "health check timed out after {}ms",
                    timeout.as_millis()
                )),
            };
            if let Some(error) = &error {
                warn!(agent = %agent.role(), provider = %agent.provider_name(), %error, "Dependency unhealthy");
            }

            DependencyHealth {
                name: *agent.role(),
                provider: agent.provider_name().clone(),
                healthy: error.is_none(),
                error,
                capabilities: *agent.capabilities(),
            }
        });

        futures::future::join_all(probes).await
    }

    /// Drain queued commits, waiting at most `timeout`.
    ///
    /// Returns `false` if commits were abandoned.
    pub async fn shutdown(&self, timeout: Duration) -> bool {
        info!(timeout_ms = timeout.as_millis() as u64, "Draining commit queue");
        self.commits.shutdown(timeout).await
    }
}

fn push_stage(response: &mut SceneResponse, info: StageInfo) {
    debug!(
        agent = %info.agent,
        operation = %info.operation,
        duration_ms = info.duration_ms,
        tokens = info.tokens,
        "Stage finished"
    );
    SwarmMetrics::get().record_stage(&info.operation, info.duration_ms);
    response.stages.push(info);
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
