// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use baxter::chat::engine::{ensure_project, record_artifact, record_turn};
use baxter::chat::{TurnEngine, TurnRequest};
use baxter::export;
use baxter::llm::message::Message;
use baxter::llm::mock_backend::MockBackend;
use baxter::prompts::{ArtifactSlot, Mode};
use baxter::relay::RelayOptions;
use baxter::store::ChatStore;

fn engine_with(backend: MockBackend) -> TurnEngine {
    let options = RelayOptions {
        model: "mock-model".to_string(),
        max_tokens: 512,
        temperature: 0.0,
        stall_timeout: Duration::from_secs(5),
    };
    TurnEngine::new(Arc::new(backend), options)
}

fn temp_store(dir: &TempDir) -> ChatStore {
    ChatStore::open(dir.path().join("baxter.db")).unwrap()
}

#[tokio::test]
async fn test_full_turn_flow_persists_transcript_and_artifact() {
    let prd = "# Refund Flow\n## 1. Feature Title\nMerchant-initiated refunds";
    let backend = MockBackend::new().with_fragments([prd]);
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let mut store = temp_store(&temp_dir);

    // Simulate a wire request from the presentation layer
    let body = r#"{
        "messages": [{"role": "user", "content": "Draft a PRD for merchant refunds"}],
        "userRole": "Senior PM",
        "companyContext": "B2B Fintech",
        "mode": "draft"
    }"#;
    let request = TurnRequest::from_json(body).unwrap();

    let assistant_text = engine.collect_turn(&request).await.unwrap();
    assert_eq!(assistant_text, prd);

    // Persistence happens after the stream is fully drained
    record_turn(
        &mut store,
        &request.messages[0].content,
        &assistant_text,
    )
    .unwrap();
    let project = ensure_project(&store, &request.messages[0].content).unwrap();
    record_artifact(&store, project.id, request.mode(), &assistant_text).unwrap();

    let rows = store.recent_messages(10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].content, prd);

    let loaded = store.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.full_prd.as_deref(), Some(prd));
    assert_eq!(loaded.title, "Draft a PRD for merchant refunds");
}

#[tokio::test]
async fn test_failed_turn_is_not_persisted() {
    let backend = MockBackend::new().with_error_after(["partial "], "connection reset");
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let store = temp_store(&temp_dir);

    let request = TurnRequest::new(
        vec![Message::user("Draft a PRD")],
        "Senior PM",
        "",
        "draft",
    );

    // The caller observes the failure and must not record the partial turn
    let result = engine.collect_turn(&request).await;
    assert!(result.is_err());
    assert!(store.recent_messages(10).unwrap().is_empty());
}

#[tokio::test]
async fn test_stories_turn_populates_stories_slot_only() {
    let stories = "## Stories\n### Story 1";
    let backend = MockBackend::new().with_fragments([stories]);
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let mut store = temp_store(&temp_dir);

    let request = TurnRequest::new(
        vec![Message::user("Split the PRD into stories")],
        "Senior PM",
        "",
        "stories",
    );

    let text = engine.collect_turn(&request).await.unwrap();
    record_turn(&mut store, &request.messages[0].content, &text).unwrap();
    let project = ensure_project(&store, &request.messages[0].content).unwrap();
    record_artifact(&store, project.id, request.mode(), &text).unwrap();

    let loaded = store.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.user_stories.as_deref(), Some(stories));
    assert!(loaded.full_prd.is_none());
    assert!(loaded.impact_analysis.is_none());
}

#[tokio::test]
async fn test_interview_turn_writes_no_artifact() {
    let backend = MockBackend::new().with_fragments(["[Clarifying] What counts as a refund?"]);
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let store = temp_store(&temp_dir);

    let request = TurnRequest::new(
        vec![Message::user("refund flow")],
        "Senior PM",
        "",
        "interview",
    );
    let text = engine.collect_turn(&request).await.unwrap();

    let project = ensure_project(&store, "refund flow").unwrap();
    record_artifact(&store, project.id, request.mode(), &text).unwrap();

    let loaded = store.get_project(project.id).unwrap().unwrap();
    assert!(loaded.full_prd.is_none());
    assert!(loaded.user_stories.is_none());
    assert!(loaded.impact_analysis.is_none());
}

#[tokio::test]
async fn test_unknown_mode_turn_behaves_as_draft() {
    let backend = MockBackend::new().with_fragments(["# PRD"]);
    let engine = engine_with(backend.clone());

    let temp_dir = TempDir::new().unwrap();
    let store = temp_store(&temp_dir);

    let request = TurnRequest::new(vec![Message::user("go")], "PM", "", "mystery-mode");
    assert_eq!(request.mode(), Mode::Unknown);

    let text = engine.collect_turn(&request).await.unwrap();

    // Template fell back to the drafting prompt
    let system = backend.last_request().unwrap().system.unwrap();
    assert!(system.contains("11-ELEMENT STRUCTURE"));

    // Artifact lands in the PRD slot
    let project = ensure_project(&store, "go").unwrap();
    record_artifact(&store, project.id, request.mode(), &text).unwrap();
    let loaded = store.get_project(project.id).unwrap().unwrap();
    assert_eq!(loaded.full_prd.as_deref(), Some("# PRD"));
}

#[tokio::test]
async fn test_stored_artifact_exports_as_docx() {
    let prd = "# Refund Flow\n## Scope\nMerchant refunds only";
    let backend = MockBackend::new().with_fragments([prd]);
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let store = temp_store(&temp_dir);

    let request = TurnRequest::new(vec![Message::user("draft it")], "PM", "", "draft");
    let text = engine.collect_turn(&request).await.unwrap();

    let project = ensure_project(&store, "draft it").unwrap();
    record_artifact(&store, project.id, request.mode(), &text).unwrap();

    let loaded = store.latest_project().unwrap().unwrap();
    let content = loaded.artifact(ArtifactSlot::FullPrd).unwrap();
    let bytes = export::export_docx(content).unwrap();

    // DOCX packages start with the zip local-file-header magic
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_persistence_failure_does_not_invalidate_generation() {
    let backend = MockBackend::new().with_fragments(["# PRD"]);
    let engine = engine_with(backend);

    let temp_dir = TempDir::new().unwrap();
    let store = temp_store(&temp_dir);

    let request = TurnRequest::new(vec![Message::user("go")], "PM", "", "draft");
    let text = engine.collect_turn(&request).await.unwrap();

    // Writing to a project that does not exist fails on the store channel;
    // the generated text is untouched by that failure.
    let bogus = uuid::Uuid::new_v4();
    let result = record_artifact(&store, bogus, Mode::Draft, &text);
    assert!(result.is_err());
    assert_eq!(text, "# PRD");
}
