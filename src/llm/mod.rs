// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM backend abstraction and implementations
//!
//! Defines the chat completion backend trait and the OpenAI-compatible
//! streaming client.

pub mod factory;
pub mod message;
pub mod mock_backend;
pub mod provider;
pub mod providers;

pub use message::{Message, Role};
pub use provider::{ChatBackend, CompletionRequest, FinishReason, StreamEvent};
