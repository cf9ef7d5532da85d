// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenAI-compatible API backend implementation
//!
//! Implements the ChatBackend trait against any OpenAI-compatible chat
//! completions endpoint, parsing the SSE stream into StreamEvents.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, BaxterError, Result};
use crate::llm::message::{Message, Role};
use crate::llm::provider::{
    ChatBackend, CompletionRequest, EventStream, FinishReason, StreamEvent,
};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible chat completions backend
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiBackend {
    /// Create a new backend against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Create with a custom base URL (compatible gateways, test servers)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Convert internal messages to the wire format, system prompt first
    fn convert_messages(&self, messages: &[Message], system: Option<&str>) -> Vec<WireMessage> {
        let mut result = Vec::with_capacity(messages.len() + 1);

        if let Some(sys) = system {
            result.push(WireMessage {
                role: "system".to_string(),
                content: sys.to_string(),
            });
        }

        for m in messages {
            let role = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            };
            result.push(WireMessage {
                role: role.to_string(),
                content: m.content.clone(),
            });
        }

        result
    }

    /// Build the request body
    fn build_request(&self, request: &CompletionRequest, stream: bool) -> WireRequest {
        WireRequest {
            model: request.model.clone(),
            messages: self.convert_messages(&request.messages, request.system.as_deref()),
            max_tokens: Some(request.max_tokens),
            temperature: Some(request.temperature),
            stream,
        }
    }

    /// Parse an error response
    fn parse_error(&self, status: u16, body: &str) -> BaxterError {
        if let Ok(error_response) = serde_json::from_str::<WireError>(body) {
            let message = error_response.error.message;
            let code = error_response.error.code.as_deref().unwrap_or("");
            let error_type = error_response.error.error_type.as_deref().unwrap_or("");

            match (status, code, error_type) {
                (401, _, _) | (_, "invalid_api_key", _) | (_, _, "authentication_error") => {
                    BaxterError::Api(ApiError::AuthenticationFailed)
                }
                (429, _, _) | (_, "rate_limit_exceeded", _) => {
                    BaxterError::Api(ApiError::RateLimited)
                }
                (_, "model_not_found", _) => BaxterError::Api(ApiError::ModelNotFound(message)),
                _ => BaxterError::Api(ApiError::ServerError { status, message }),
            }
        } else {
            BaxterError::Api(ApiError::ServerError {
                status,
                message: body.to_string(),
            })
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let body = self.build_request(&request, true);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status, &body));
        }

        let byte_stream = response.bytes_stream();

        // State for SSE parsing: (line buffer, message_started)
        type StreamState = (String, bool);

        let event_stream = byte_stream
            .map(|result| {
                result.map_err(|e| BaxterError::Api(ApiError::StreamError(e.to_string())))
            })
            .scan(
                (String::new(), false),
                |state: &mut StreamState, result| {
                    let (buffer, message_started) = state;

                    let chunk = match result {
                        Ok(bytes) => String::from_utf8_lossy(&bytes).to_string(),
                        Err(e) => return futures::future::ready(Some(vec![Err(e)])),
                    };

                    buffer.push_str(&chunk);

                    let mut events = Vec::new();

                    // Parse SSE events (data: ... lines)
                    while let Some(line_end) = buffer.find('\n') {
                        let line = buffer[..line_end].trim().to_string();
                        *buffer = buffer[line_end + 1..].to_string();

                        if line.is_empty() || line.starts_with(':') {
                            continue;
                        }

                        if let Some(data) = line.strip_prefix("data: ") {
                            if data == "[DONE]" {
                                events.push(Ok(StreamEvent::Done));
                                continue;
                            }

                            if let Ok(chunk) = serde_json::from_str::<WireStreamChunk>(data) {
                                // Emit Start on first chunk
                                if !*message_started {
                                    *message_started = true;
                                    events.push(Ok(StreamEvent::Start {
                                        id: chunk.id.clone(),
                                        model: chunk.model.clone().unwrap_or_default(),
                                    }));
                                }

                                if let Some(choice) = chunk.choices.into_iter().next() {
                                    if let Some(text) = choice.delta.content {
                                        events.push(Ok(StreamEvent::TextDelta { text }));
                                    }

                                    if let Some(reason) = choice.finish_reason {
                                        events.push(Ok(StreamEvent::Finish {
                                            reason: FinishReason::from_wire(&reason),
                                        }));
                                    }
                                }
                            }
                        }
                    }

                    futures::future::ready(Some(events))
                },
            )
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

// OpenAI API wire types

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
    code: Option<String>,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// Streaming types

#[derive(Debug, Deserialize)]
struct WireStreamChunk {
    id: String,
    model: Option<String>,
    choices: Vec<WireStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct WireStreamChoice {
    delta: WireDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
}
