// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming relay between the upstream completion API and the consumer
//!
//! One relay invocation opens exactly one upstream request and re-emits each
//! non-empty text fragment, in arrival order, on the returned stream. The
//! stream ends cleanly when the upstream completes; any upstream failure is
//! terminal for the invocation. The relay holds no state across invocations
//! and persists nothing; callers drain the stream and decide what to keep.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_stream::try_stream;
use futures::{Stream, StreamExt};

use crate::config::Settings;
use crate::error::{ApiError, BaxterError, Result};
use crate::llm::message::Message;
use crate::llm::provider::{ChatBackend, CompletionRequest, StreamEvent};

/// A pinned, boxed stream of forwarded text fragments
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Per-invocation parameters for the relay
#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Model to request from the upstream
    pub model: String,

    /// Maximum tokens in a response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,

    /// How long to wait for the next fragment before failing the invocation
    pub stall_timeout: Duration,
}

impl RelayOptions {
    /// Build options from loaded settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model: settings.upstream.default_model.clone(),
            max_tokens: settings.generation.max_tokens,
            temperature: settings.generation.temperature,
            stall_timeout: Duration::from_secs(settings.generation.stall_timeout_secs),
        }
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Bridges one conversation turn to the upstream completion API
pub struct Relay {
    backend: Arc<dyn ChatBackend>,
    options: RelayOptions,
}

impl Relay {
    /// Create a new relay over the given backend
    pub fn new(backend: Arc<dyn ChatBackend>, options: RelayOptions) -> Self {
        Self { backend, options }
    }

    /// Get the relay options
    pub fn options(&self) -> &RelayOptions {
        &self.options
    }

    /// Relay one conversation turn.
    ///
    /// The system prompt is prepended as a synthetic leading message; the
    /// conversation itself is forwarded as-is, without validation. A failure
    /// before the first fragment is returned as `Err` here; a failure during
    /// iteration appears as a terminal `Err` item in the stream, after which
    /// no further fragments arrive and the stream does not end cleanly.
    pub async fn relay(
        &self,
        conversation: Vec<Message>,
        system_prompt: impl Into<String>,
    ) -> Result<FragmentStream> {
        let request = CompletionRequest::new(&self.options.model, conversation)
            .with_system(system_prompt)
            .with_max_tokens(self.options.max_tokens)
            .with_temperature(self.options.temperature);

        tracing::debug!(model = %request.model, messages = request.messages.len(), "opening upstream stream");

        // The single upstream call for this invocation.
        let mut upstream = self.backend.complete_stream(request).await?;
        let stall = self.options.stall_timeout;

        let stream = try_stream! {
            loop {
                let item = tokio::time::timeout(stall, upstream.next())
                    .await
                    .map_err(|_| BaxterError::Api(ApiError::Timeout))?;

                match item {
                    // Upstream exhausted: the only non-error termination.
                    None => break,
                    Some(event) => {
                        if let StreamEvent::TextDelta { text } = event? {
                            // Role-only and finish-only chunks carry no text
                            // and are never forwarded, not even as empty
                            // writes.
                            if !text.is_empty() {
                                yield text;
                            }
                        }
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Accumulator for the assistant text of one turn
///
/// Fragments are appended in forwarding order, so the accumulated text is
/// always a prefix-extension of every earlier observation.
#[derive(Debug, Default)]
pub struct TurnAccumulator {
    text: String,
    fragment_count: usize,
}

impl TurnAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a forwarded fragment
    pub fn push(&mut self, fragment: &str) {
        self.text.push_str(fragment);
        self.fragment_count += 1;
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of fragments appended
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Whether any text has arrived
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Consume the accumulator and return the final text
    pub fn finish(self) -> String {
        self.text
    }
}
