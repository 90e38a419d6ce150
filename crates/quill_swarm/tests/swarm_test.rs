mod test_utils;

use quill_core::{AgentRole, IssueCategory, SceneSpec, Severity};
use quill_error::{ProviderErrorKind, SwarmErrorKind};
use quill_models::{AgentConfigs, MockProvider, MOCK_RESPONSE};
use quill_swarm::{InMemoryStore, Swarm, SwarmOptions};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{request, MockResponse, Script, ScriptedProvider, DRAFT, REVISION};

const ISSUES_JSON: &str = r#"[
  {"category": "fact", "severity": "error", "description": "Mara is left-handed", "suggestion": "Use her left hand"},
  {"category": "pov", "severity": "info", "description": "Consider more interiority"},
  {"category": "weather", "severity": "error", "description": "Not a real category"}
]"#;

fn swarm(script: &Script) -> (Swarm, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let swarm = Swarm::new(script.agents(), store.clone(), SwarmOptions::default());
    (swarm, store)
}

fn operations(response: &quill_core::SceneResponse) -> Vec<&str> {
    response.stages.iter().map(|s| s.operation.as_str()).collect()
}

#[tokio::test]
async fn test_no_issues_skips_editor() -> anyhow::Result<()> {
    let script = Script::happy();
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert_eq!(operations(&response), ["design_scene", "generate_prose", "validate"]);
    assert!(!response.revision_made);
    assert!(response.issues.is_empty());
    assert_eq!(response.text, DRAFT);
    assert_eq!(response.request_id, "scene-1");
    assert_eq!(script.editor.call_count(), 0);

    let spec = response.scenespec.as_ref().expect("design present");
    assert_eq!(spec.scene.title, "The Vault");
    assert!(response.stages.iter().all(|s| s.tokens == 30));
    Ok(())
}

#[tokio::test]
async fn test_issues_trigger_single_revision() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(ISSUES_JSON.into()));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert_eq!(
        operations(&response),
        ["design_scene", "generate_prose", "validate", "fix_issues"]
    );
    assert_eq!(response.stages[3].agent, AgentRole::Editor);
    assert!(response.revision_made);
    assert_eq!(response.text, REVISION);
    assert_eq!(script.editor.call_count(), 1);

    // The element with an unknown category is skipped.
    assert_eq!(response.issues.len(), 2);
    assert_eq!(response.issues[0].category, IssueCategory::Fact);
    assert_eq!(response.issues[1].severity, Severity::Info);
    Ok(())
}

#[tokio::test]
async fn test_capitalised_issues_still_trigger_revision() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(
        r#"{"issues": [{"category": "Fact", "severity": "Error", "description": "Eye colour changed"}]}"#
            .into(),
    ));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert_eq!(response.issues.len(), 1);
    assert_eq!(response.issues[0].severity, Severity::Error);
    assert!(response.revision_made);
    assert_eq!(response.text, REVISION);
    assert_eq!(script.editor.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_editor_prompt_excludes_info_issues() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(ISSUES_JSON.into()));
    let (swarm, _store) = swarm(&script);

    swarm.generate_scene(&request("Crack the vault")).await?;

    let prompt = script.editor.user_prompt(0).expect("editor called");
    assert!(prompt.contains("Mara is left-handed"));
    assert!(prompt.contains("Use her left hand"));
    assert!(!prompt.contains("interiority"));
    assert!(prompt.contains(DRAFT));
    Ok(())
}

#[tokio::test]
async fn test_editor_failure_keeps_draft() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(ISSUES_JSON.into()));
    script.editor.push(MockResponse::Error(ProviderErrorKind::GenerationFailed {
        provider: "scripted".into(),
        cause: "connection reset".into(),
    }));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert!(!response.revision_made);
    assert_eq!(response.text, DRAFT);
    let editor_stage = response.stages.last().expect("stages recorded");
    assert_eq!(editor_stage.operation, "fix_issues");
    assert_eq!(editor_stage.tokens, 0);
    Ok(())
}

#[tokio::test]
async fn test_empty_revision_keeps_draft() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(ISSUES_JSON.into()));
    script.editor.push(MockResponse::Success("   ".into()));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert!(!response.revision_made);
    assert_eq!(response.text, DRAFT);
    assert_eq!(response.stages.len(), 4);
    Ok(())
}

#[tokio::test]
async fn test_design_wrapped_in_prose_is_recovered() -> anyhow::Result<()> {
    let script = Script::happy();
    script.director.push(MockResponse::Success(format!(
        "Sure! Here is the scene design you asked for:\n\n{}\n\nLet me know if you want changes {{or more}}.",
        test_utils::DESIGN_JSON
    )));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    let spec = response.scenespec.expect("design present");
    assert_eq!(spec.scene.title, "The Vault");
    assert_eq!(spec.constraints.location, "Bank basement");
    Ok(())
}

#[tokio::test]
async fn test_unparseable_design_uses_empty_spec() -> anyhow::Result<()> {
    let script = Script::happy();
    script
        .director
        .push(MockResponse::Success("I could not design this scene.".into()));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert_eq!(response.scenespec, Some(SceneSpec::default()));
    assert_eq!(response.text, DRAFT);

    // The Writer falls back to the caller's intention.
    let prompt = script.writer.user_prompt(0).expect("writer called");
    assert!(prompt.contains("Crack the vault"));
    Ok(())
}

#[tokio::test]
async fn test_director_failure_aborts() -> anyhow::Result<()> {
    let script = Script::happy();
    script.director.push(MockResponse::Error(ProviderErrorKind::Rejected {
        provider: "scripted".into(),
        status: 503,
        message: "overloaded".into(),
    }));
    let (swarm, _store) = swarm(&script);

    let err = swarm
        .generate_scene(&request("Crack the vault"))
        .await
        .expect_err("director failure must abort");

    assert!(matches!(err.kind, SwarmErrorKind::DirectorFailed(_)));
    assert!(!err.is_timeout());
    assert_eq!(script.writer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_writer_timeout_aborts() -> anyhow::Result<()> {
    let script = Script::happy();
    script
        .writer
        .push(MockResponse::Error(ProviderErrorKind::Timeout("scripted".into())));
    let (swarm, store) = swarm(&script);

    let err = swarm
        .generate_scene(&request("Crack the vault"))
        .await
        .expect_err("writer failure must abort");

    assert!(matches!(err.kind, SwarmErrorKind::WriterFailed(_)));
    assert!(err.is_timeout());
    assert_eq!(script.checker.call_count(), 0);

    // Nothing is committed for an aborted run.
    assert!(swarm.shutdown(Duration::from_secs(1)).await);
    assert!(store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn test_checker_failure_continues_without_issues() -> anyhow::Result<()> {
    let script = Script::happy();
    script
        .checker
        .push(MockResponse::Error(ProviderErrorKind::Timeout("scripted".into())));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert_eq!(operations(&response), ["design_scene", "generate_prose", "validate"]);
    assert_eq!(response.stages[2].tokens, 0);
    assert!(response.issues.is_empty());
    assert!(!response.revision_made);
    assert_eq!(script.editor.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_checker_prose_means_no_issues() -> anyhow::Result<()> {
    let script = Script::happy();
    script
        .checker
        .push(MockResponse::Success("Looks consistent to me.".into()));
    let (swarm, _store) = swarm(&script);

    let response = swarm.generate_scene(&request("Crack the vault")).await?;

    assert!(response.issues.is_empty());
    assert_eq!(script.editor.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_stage_parameters() -> anyhow::Result<()> {
    let script = Script::happy();
    script.checker.push(MockResponse::Success(ISSUES_JSON.into()));
    let (swarm, _store) = swarm(&script);

    swarm.generate_scene(&request("Crack the vault")).await?;

    let director = &script.director.calls()[0].params;
    assert!(director.json_mode);
    assert_eq!(director.max_tokens, 2000);

    let writer = &script.writer.calls()[0].params;
    assert_eq!(writer.max_tokens, 1200);
    assert!((writer.temperature - 0.8).abs() < f32::EPSILON);

    let checker = &script.checker.calls()[0].params;
    assert_eq!(checker.max_tokens, 1000);

    let editor = &script.editor.calls()[0].params;
    assert_eq!(editor.max_tokens, DRAFT.chars().count() as u32 + 500);
    Ok(())
}

#[tokio::test]
async fn test_commit_drained_on_shutdown() -> anyhow::Result<()> {
    let script = Script::happy();
    let (swarm, store) = swarm(&script);

    swarm.generate_scene(&request("Crack the vault")).await?;
    assert!(swarm.shutdown(Duration::from_secs(2)).await);

    let records = store.records().await;
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.scene_id(), "scene-1");
    assert_eq!(*record.chapter(), 3);
    assert_eq!(record.pov_character().as_deref(), Some("Mara"));
    assert_eq!(
        record.summary(),
        "Mara pressed her ear to the steel. The dial clicked. Somewhere above, a bell began to ring."
    );
    assert_eq!(record.facts(), &vec!["Mara is left-handed".to_string()]);
    assert_eq!(record.foreshadowing_resolved(), &vec!["f-1".to_string()]);

    // Fact extraction is off by default.
    assert_eq!(script.committer.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_llm_fact_extraction() -> anyhow::Result<()> {
    let script = Script::happy();
    let store = Arc::new(InMemoryStore::new());
    let options = SwarmOptions {
        llm_fact_extraction: true,
        ..SwarmOptions::default()
    };
    let swarm = Swarm::new(script.agents(), store.clone(), options);

    swarm.generate_scene(&request("Crack the vault")).await?;
    assert!(swarm.shutdown(Duration::from_secs(2)).await);

    let records = store.records().await;
    assert_eq!(records[0].facts(), &vec!["The vault is empty".to_string()]);
    assert_eq!(script.committer.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_mock_backend_end_to_end() -> anyhow::Result<()> {
    let agents = AgentConfigs::uniform("mock", Arc::new(MockProvider::default()));
    let store = Arc::new(InMemoryStore::new());
    let swarm = Swarm::new(agents, store.clone(), SwarmOptions::default());

    let response = swarm.generate_scene(&request("Anything")).await?;

    assert_eq!(response.text, MOCK_RESPONSE);
    assert_eq!(
        response.scenespec.map(|s| s.scene.title),
        Some("Mock Scene".to_string())
    );
    assert_eq!(response.stages.len(), 3);
    assert!(swarm.shutdown(Duration::from_secs(2)).await);
    assert_eq!(store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_provider_health_reports_each_role() -> anyhow::Result<()> {
    let mut script = Script::happy();
    script.checker = Arc::new(ScriptedProvider::always("[]").unhealthy("connection refused"));
    script.editor = Arc::new(ScriptedProvider::always("").with_delay(Duration::from_secs(5)));
    let (swarm, _store) = swarm(&script);

    let health = swarm.provider_health(Duration::from_millis(100)).await;

    assert_eq!(health.len(), 5);
    let by_role = |role: AgentRole| health.iter().find(|h| h.name == role).expect("role present");

    assert!(by_role(AgentRole::Director).healthy);
    assert_eq!(by_role(AgentRole::Director).provider, "director");

    let checker = by_role(AgentRole::Checker);
    assert!(!checker.healthy);
    assert!(checker.error.as_deref().unwrap_or_default().contains("connection refused"));

    let editor = by_role(AgentRole::Editor);
    assert!(!editor.healthy);
    assert!(editor.error.as_deref().unwrap_or_default().contains("timed out"));
    assert_eq!(*editor.capabilities.context_length(), 4096);
    Ok(())
}
