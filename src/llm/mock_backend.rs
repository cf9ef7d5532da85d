// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock chat backend for testing
//!
//! Provides a scripted implementation of the ChatBackend trait that can be
//! used in unit tests without making real API calls.

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ApiError, BaxterError, Result};
use crate::llm::provider::{
    ChatBackend, CompletionRequest, EventStream, FinishReason, StreamEvent,
};

/// One scripted step of a mock stream
#[derive(Clone, Debug)]
pub enum ScriptItem {
    /// Emit a stream event
    Event(StreamEvent),
    /// Emit a stream error (mid-stream failure)
    Error(String),
}

/// A mock chat backend that replays a fixed script
#[derive(Clone)]
pub struct MockBackend {
    /// Backend name
    name: String,
    /// Script replayed by every complete_stream call
    script: Arc<Mutex<Vec<ScriptItem>>>,
    /// Error returned before any stream is produced, if set
    open_error: Arc<Mutex<Option<String>>>,
    /// Call counter
    call_count: Arc<AtomicUsize>,
    /// Recorded requests
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend with an empty script
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            script: Arc::new(Mutex::new(Vec::new())),
            open_error: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script a well-formed stream: Start, one TextDelta per fragment,
    /// Finish(Stop), Done.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script = vec![ScriptItem::Event(StreamEvent::Start {
            id: "mock-1".to_string(),
            model: "mock-model".to_string(),
        })];
        for fragment in fragments {
            script.push(ScriptItem::Event(StreamEvent::TextDelta {
                text: fragment.into(),
            }));
        }
        script.push(ScriptItem::Event(StreamEvent::Finish {
            reason: FinishReason::Stop,
        }));
        script.push(ScriptItem::Event(StreamEvent::Done));
        self.with_script(script)
    }

    /// Replace the script entirely
    pub fn with_script(self, script: Vec<ScriptItem>) -> Self {
        *self.script.lock().unwrap() = script;
        self
    }

    /// Fail every complete_stream call before any stream is produced
    pub fn with_open_error(self, message: impl Into<String>) -> Self {
        *self.open_error.lock().unwrap() = Some(message.into());
        self
    }

    /// Script a stream that fails after the given fragments
    pub fn with_error_after<I, S>(self, fragments: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut script = vec![ScriptItem::Event(StreamEvent::Start {
            id: "mock-1".to_string(),
            model: "mock-model".to_string(),
        })];
        for fragment in fragments {
            script.push(ScriptItem::Event(StreamEvent::TextDelta {
                text: fragment.into(),
            }));
        }
        script.push(ScriptItem::Error(message.into()));
        self.with_script(script)
    }

    /// Get the number of times complete_stream() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.recorded_requests.lock().unwrap().last().cloned()
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        self.recorded_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.recorded_requests.lock().unwrap().push(request);

        if let Some(message) = self.open_error.lock().unwrap().clone() {
            return Err(BaxterError::Api(ApiError::Network(message)));
        }

        let items: Vec<Result<StreamEvent>> = self
            .script
            .lock()
            .unwrap()
            .iter()
            .map(|item| match item {
                ScriptItem::Event(event) => Ok(event.clone()),
                ScriptItem::Error(message) => {
                    Err(BaxterError::Api(ApiError::StreamError(message.clone())))
                }
            })
            .collect();

        Ok(Box::pin(stream::iter(items)))
    }
}
