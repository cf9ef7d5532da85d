// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat backend trait and related types
//!
//! Defines the abstraction layer over the upstream completion API.

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::Result;
use crate::llm::message::Message;

/// A pinned, boxed stream of events from a streaming completion
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Main trait for chat completion backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Get the backend name (e.g., "openai")
    fn name(&self) -> &str;

    /// Streaming completion
    ///
    /// Opens exactly one upstream request and returns a lazily-evaluated,
    /// single-pass sequence of events. Failures before the first event are
    /// returned as an error from this call; failures during iteration are
    /// surfaced as `Err` items in the stream.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream>;
}

/// Request for completion
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model to use
    pub model: String,

    /// Messages in the conversation
    pub messages: Vec<Message>,

    /// System prompt, prepended as the leading message on the wire
    pub system: Option<String>,

    /// Maximum tokens in response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl CompletionRequest {
    /// Create a new completion request
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            system: None,
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    /// Set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Events from a streaming response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Start of the response (first chunk received)
    Start { id: String, model: String },

    /// Incremental text fragment
    ///
    /// May carry an empty string for role-only or keep-alive chunks; the
    /// relay filters those before anything reaches a consumer.
    TextDelta { text: String },

    /// The upstream reported why generation stopped
    Finish { reason: FinishReason },

    /// End of the stream (`[DONE]` marker)
    Done,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of message
    Stop,
    /// Hit max tokens
    Length,
    /// Content was filtered
    ContentFilter,
    /// Any other upstream-specific reason
    Other,
}

impl FinishReason {
    /// Map an OpenAI-style finish_reason string
    pub fn from_wire(reason: &str) -> Self {
        match reason {
            "stop" => FinishReason::Stop,
            "length" => FinishReason::Length,
            "content_filter" => FinishReason::ContentFilter,
            _ => FinishReason::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== CompletionRequest Tests =====

    #[test]
    fn test_completion_request_new() {
        let messages = vec![Message::user("Hello")];
        let request = CompletionRequest::new("gpt-4o", messages);

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.max_tokens, 4096);
        assert!((request.temperature - 0.7).abs() < 0.001);
        assert!(request.system.is_none());
    }

    #[test]
    fn test_completion_request_with_system() {
        let messages = vec![Message::user("Hello")];
        let request =
            CompletionRequest::new("gpt-4o", messages).with_system("You are a business analyst");

        assert_eq!(
            request.system,
            Some("You are a business analyst".to_string())
        );
    }

    #[test]
    fn test_completion_request_chained() {
        let messages = vec![Message::user("Hello")];
        let request = CompletionRequest::new("gpt-4o", messages)
            .with_system("System prompt")
            .with_max_tokens(2048)
            .with_temperature(0.9);

        assert_eq!(request.system, Some("System prompt".to_string()));
        assert_eq!(request.max_tokens, 2048);
        assert!((request.temperature - 0.9).abs() < 0.001);
    }

    // ===== StreamEvent Tests =====

    #[test]
    fn test_stream_event_text_delta() {
        let event = StreamEvent::TextDelta {
            text: "hello".to_string(),
        };
        if let StreamEvent::TextDelta { text } = event {
            assert_eq!(text, "hello");
        } else {
            panic!("Expected TextDelta variant");
        }
    }

    #[test]
    fn test_stream_event_start() {
        let event = StreamEvent::Start {
            id: "chatcmpl-123".to_string(),
            model: "gpt-4o".to_string(),
        };
        if let StreamEvent::Start { id, model } = event {
            assert_eq!(id, "chatcmpl-123");
            assert_eq!(model, "gpt-4o");
        } else {
            panic!("Expected Start variant");
        }
    }

    // ===== FinishReason Tests =====

    #[test]
    fn test_finish_reason_from_wire() {
        assert_eq!(FinishReason::from_wire("stop"), FinishReason::Stop);
        assert_eq!(FinishReason::from_wire("length"), FinishReason::Length);
        assert_eq!(
            FinishReason::from_wire("content_filter"),
            FinishReason::ContentFilter
        );
        assert_eq!(
            FinishReason::from_wire("function_call"),
            FinishReason::Other
        );
    }

    #[test]
    fn test_finish_reason_equality() {
        assert_eq!(FinishReason::Stop, FinishReason::Stop);
        assert_ne!(FinishReason::Stop, FinishReason::Length);
    }
}
