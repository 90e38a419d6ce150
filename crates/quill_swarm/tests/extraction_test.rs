use anyhow::Context;
use quill_core::{IssueCategory, Severity};
use quill_swarm::{parse_issues, parse_scene_spec, parse_string_list, SpecSource};

#[test]
fn test_strict_design() {
    let (spec, source) = parse_scene_spec(r#"{"scene": {"title": "Dawn"}}"#);
    assert_eq!(source, SpecSource::Strict);
    assert_eq!(spec.scene.title, "Dawn");
}

#[test]
fn test_design_in_code_block() {
    let text = "Here it is:\n```json\n{\"scene\": {\"title\": \"Dusk\"}}\n```\n";
    let (spec, source) = parse_scene_spec(text);
    assert_eq!(source, SpecSource::Extracted);
    assert_eq!(spec.scene.title, "Dusk");
}

#[test]
fn test_design_with_braces_in_strings() {
    let text = r#"Design: {"narrative": {"summary": "She drew a } on the wall"}} -- end"#;
    let (spec, source) = parse_scene_spec(text);
    assert_eq!(source, SpecSource::Extracted);
    assert_eq!(spec.narrative.summary, "She drew a } on the wall");
}

#[test]
fn test_design_skips_unparseable_span() {
    let text = r#"Use {placeholder} syntax. {"scene": {"title": "Second"}}"#;
    let (spec, source) = parse_scene_spec(text);
    assert_eq!(source, SpecSource::Extracted);
    assert_eq!(spec.scene.title, "Second");
}

#[test]
fn test_design_fallback() {
    let (spec, source) = parse_scene_spec("no structure here");
    assert_eq!(source, SpecSource::Fallback);
    assert!(spec.is_empty());

    let (spec, source) = parse_scene_spec("{ unterminated");
    assert_eq!(source, SpecSource::Fallback);
    assert!(spec.is_empty());
}

#[test]
fn test_issues_wrapped_object() -> anyhow::Result<()> {
    let text = r#"{"issues": [{"category": "world", "severity": "warning", "description": "Magic without cost"}]}"#;
    let issues = parse_issues(text).context("issues found")?;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].category, IssueCategory::World);
    assert_eq!(issues[0].severity, Severity::Warning);
    Ok(())
}

#[test]
fn test_issues_in_prose() -> anyhow::Result<()> {
    let text = "I found these:\n[{\"category\": \"character\", \"severity\": \"error\", \"description\": \"Out of voice\", \"location\": \"paragraph 2\"}]\nThanks.";
    let issues = parse_issues(text).context("issues found")?;
    assert_eq!(issues[0].location.as_deref(), Some("paragraph 2"));
    Ok(())
}

#[test]
fn test_issues_accept_any_case() -> anyhow::Result<()> {
    let text = r#"[
      {"category": "Fact", "severity": "Error", "description": "Eye colour changed"},
      {"category": "POV", "severity": "WARNING", "description": "Head hop"}
    ]"#;
    let issues = parse_issues(text).context("issues found")?;
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].category, IssueCategory::Fact);
    assert_eq!(issues[0].severity, Severity::Error);
    assert_eq!(issues[0].description, "Eye colour changed");
    assert_eq!(issues[1].category, IssueCategory::Pov);
    assert!(issues[1].severity.is_actionable());
    Ok(())
}

#[test]
fn test_issue_without_description_is_kept() -> anyhow::Result<()> {
    let issues = parse_issues(r#"[{"category": "fact", "severity": "error"}]"#)
        .context("issues found")?;
    assert_eq!(issues.len(), 1);
    assert!(issues[0].description.is_empty());
    Ok(())
}

#[test]
fn test_issues_unknown_names_skipped() -> anyhow::Result<()> {
    let text = r#"[
      {"category": "weather", "severity": "error", "description": "Not a category"},
      {"category": "world", "severity": "catastrophic", "description": "Not a severity"},
      {"category": "world", "severity": "info", "description": "Kept"}
    ]"#;
    let issues = parse_issues(text).context("issues found")?;
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].description, "Kept");
    Ok(())
}

#[test]
fn test_issues_empty_array_and_missing() {
    assert_eq!(parse_issues("[]"), Some(Vec::new()));
    assert_eq!(parse_issues("No problems."), None);
}

#[test]
fn test_string_list_skips_non_strings() -> anyhow::Result<()> {
    let facts = parse_string_list(r#"["Ada owns a lantern", 42, null, "The bridge is out"]"#)
        .context("array found")?;
    assert_eq!(facts, ["Ada owns a lantern", "The bridge is out"]);
    Ok(())
}
