// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turn engine
//!
//! Runs one conversation turn: selects the system prompt for the request's
//! mode, hands the conversation to the relay, and exposes the fragment
//! stream to the caller. Persistence is a separate post-stream step with its
//! own error channel; a failed write never turns a completed generation into
//! a failed turn.

use std::sync::Arc;

use futures::StreamExt;
use uuid::Uuid;

use crate::chat::TurnRequest;
use crate::error::{Result, StoreError};
use crate::llm::provider::ChatBackend;
use crate::prompts::{self, Mode};
use crate::relay::{FragmentStream, Relay, RelayOptions, TurnAccumulator};
use crate::store::{ChatStore, ProjectRecord};

/// Orchestrates conversation turns over a relay
pub struct TurnEngine {
    relay: Relay,
}

impl TurnEngine {
    /// Create an engine over the given backend
    pub fn new(backend: Arc<dyn ChatBackend>, options: RelayOptions) -> Self {
        Self {
            relay: Relay::new(backend, options),
        }
    }

    /// Start streaming one turn.
    ///
    /// Renders the system prompt for the request's mode (unknown tags fall
    /// back to the drafting template) and opens the relay. The caller drains
    /// the returned stream and owns what happens to the text afterwards.
    pub async fn stream_turn(&self, request: &TurnRequest) -> Result<FragmentStream> {
        let mode = request.mode();
        let system = prompts::system_prompt(mode, &request.prompt_context());

        tracing::debug!(mode = %mode, messages = request.messages.len(), "starting turn");

        self.relay.relay(request.messages.clone(), system).await
    }

    /// Run one turn to completion and return the full assistant text.
    ///
    /// Used by one-shot callers; interactive callers drain the stream
    /// themselves to display fragments as they arrive.
    pub async fn collect_turn(&self, request: &TurnRequest) -> Result<String> {
        let mut stream = self.stream_turn(request).await?;
        let mut accumulator = TurnAccumulator::new();
        while let Some(fragment) = stream.next().await {
            accumulator.push(&fragment?);
        }
        Ok(accumulator.finish())
    }
}

/// Persist a completed turn to the chat log.
///
/// Only called after the stream has been fully drained; an aborted stream
/// must never reach this point with partial text.
pub fn record_turn(
    store: &mut ChatStore,
    user_content: &str,
    assistant_text: &str,
) -> std::result::Result<(), StoreError> {
    store.append_turn(user_content, assistant_text)
}

/// Store a completed turn's text into the project slot its mode populates.
///
/// Interview turns produce questions, not artifacts, and write nothing.
pub fn record_artifact(
    store: &ChatStore,
    project_id: Uuid,
    mode: Mode,
    content: &str,
) -> std::result::Result<(), StoreError> {
    match mode.artifact_slot() {
        Some(slot) => store.set_artifact(project_id, slot, content),
        None => Ok(()),
    }
}

/// Load the most recent project, or create one titled after the opening
/// prompt.
pub fn ensure_project(
    store: &ChatStore,
    opening_prompt: &str,
) -> std::result::Result<ProjectRecord, StoreError> {
    if let Some(project) = store.latest_project()? {
        return Ok(project);
    }
    let project = ProjectRecord::new(project_title(opening_prompt));
    store.upsert_project(&project)?;
    Ok(project)
}

/// Derive a project title from the opening prompt, truncated to 100 chars.
pub fn project_title(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return "Untitled project".to_string();
    }
    if prompt.chars().count() > 100 {
        let mut title: String = prompt.chars().take(97).collect();
        title.push_str("...");
        title
    } else {
        prompt.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::message::Message;
    use crate::llm::mock_backend::MockBackend;
    use std::time::Duration;

    fn engine_with(backend: MockBackend) -> TurnEngine {
        let options = RelayOptions {
            model: "mock-model".to_string(),
            max_tokens: 256,
            temperature: 0.0,
            stall_timeout: Duration::from_secs(5),
        };
        TurnEngine::new(Arc::new(backend), options)
    }

    #[tokio::test]
    async fn test_stream_turn_uses_mode_template() {
        let backend = MockBackend::new().with_fragments(["ok"]);
        let engine = engine_with(backend.clone());

        let request = TurnRequest::new(
            vec![Message::user("feature idea")],
            "Senior PM",
            "B2B Fintech",
            "interview",
        );
        let _ = engine.collect_turn(&request).await.unwrap();

        let system = backend.last_request().unwrap().system.unwrap();
        assert!(system.contains("exactly 5 strategic interview questions"));
        assert!(system.contains("Senior PM"));
    }

    #[tokio::test]
    async fn test_stream_turn_unknown_mode_uses_draft_template() {
        let backend = MockBackend::new().with_fragments(["ok"]);
        let engine = engine_with(backend.clone());

        let request = TurnRequest::new(vec![], "PM", "", "no-such-mode");
        let _ = engine.collect_turn(&request).await.unwrap();

        let system = backend.last_request().unwrap().system.unwrap();
        assert!(system.contains("11-ELEMENT STRUCTURE"));
    }

    #[tokio::test]
    async fn test_collect_turn_concatenates_fragments() {
        let backend = MockBackend::new().with_fragments(["## Stories", "\n", "- one"]);
        let engine = engine_with(backend);

        let request = TurnRequest::new(vec![Message::user("go")], "PM", "", "stories");
        let text = engine.collect_turn(&request).await.unwrap();
        assert_eq!(text, "## Stories\n- one");
    }

    #[tokio::test]
    async fn test_collect_turn_mid_stream_failure_is_error() {
        let backend = MockBackend::new().with_error_after(["partial"], "reset");
        let engine = engine_with(backend);

        let request = TurnRequest::new(vec![Message::user("go")], "PM", "", "draft");
        let result = engine.collect_turn(&request).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_request_never_reaches_upstream() {
        let backend = MockBackend::new().with_fragments(["ok"]);
        let result = TurnRequest::from_json("{broken");
        assert!(result.is_err());
        assert_eq!(backend.call_count(), 0);
    }

    // ===== Persistence helpers =====

    #[test]
    fn test_record_turn_appends_both_rows() {
        let mut store = ChatStore::open_in_memory().unwrap();
        record_turn(&mut store, "question", "answer").unwrap();

        let rows = store.recent_messages(10).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_record_artifact_routes_by_mode() {
        let store = ChatStore::open_in_memory().unwrap();
        let project = ProjectRecord::new("p");
        store.upsert_project(&project).unwrap();

        record_artifact(&store, project.id, Mode::Stories, "## Stories").unwrap();
        record_artifact(&store, project.id, Mode::Impact, "## Impact").unwrap();

        let loaded = store.get_project(project.id).unwrap().unwrap();
        assert_eq!(loaded.user_stories.as_deref(), Some("## Stories"));
        assert_eq!(loaded.impact_analysis.as_deref(), Some("## Impact"));
        assert!(loaded.full_prd.is_none());
    }

    #[test]
    fn test_record_artifact_interview_writes_nothing() {
        let store = ChatStore::open_in_memory().unwrap();
        let project = ProjectRecord::new("p");
        store.upsert_project(&project).unwrap();

        record_artifact(&store, project.id, Mode::Interview, "questions").unwrap();

        let loaded = store.get_project(project.id).unwrap().unwrap();
        assert!(loaded.full_prd.is_none());
        assert!(loaded.user_stories.is_none());
        assert!(loaded.impact_analysis.is_none());
    }

    #[test]
    fn test_ensure_project_creates_then_reuses() {
        let store = ChatStore::open_in_memory().unwrap();

        let first = ensure_project(&store, "Build a refund flow for merchants").unwrap();
        assert_eq!(first.title, "Build a refund flow for merchants");

        let second = ensure_project(&store, "different prompt").unwrap();
        assert_eq!(second.id, first.id);
    }

    #[test]
    fn test_project_title_truncation() {
        assert_eq!(project_title(""), "Untitled project");
        assert_eq!(project_title("short"), "short");

        let long = "x".repeat(150);
        let title = project_title(&long);
        assert!(title.chars().count() <= 100);
        assert!(title.ends_with("..."));
    }
}
