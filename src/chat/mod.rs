// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation turn orchestration
//!
//! Ties the prompt templates, the streaming relay, and the store together
//! for one turn at a time.

pub mod engine;

use serde::{Deserialize, Serialize};

use crate::error::{BaxterError, Result};
use crate::llm::message::Message;
use crate::prompts::{Mode, PromptContext};

pub use engine::TurnEngine;

/// Inbound turn request boundary contract
///
/// Wire field names match the original presentation layer. All fields
/// default so a minimal `{"messages": [...]}` body is accepted; message
/// content itself is never validated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TurnRequest {
    /// Conversation so far, oldest first
    #[serde(default)]
    pub messages: Vec<Message>,

    /// Perspective the assistant is helping
    #[serde(default, rename = "userRole")]
    pub user_role: String,

    /// Company/business context (may be empty)
    #[serde(default, rename = "companyContext")]
    pub company_context: String,

    /// Mode tag selecting the system prompt
    #[serde(default)]
    pub mode: String,
}

impl TurnRequest {
    /// Create a turn request
    pub fn new(
        messages: Vec<Message>,
        user_role: impl Into<String>,
        company_context: impl Into<String>,
        mode: impl Into<String>,
    ) -> Self {
        Self {
            messages,
            user_role: user_role.into(),
            company_context: company_context.into(),
            mode: mode.into(),
        }
    }

    /// Parse a JSON request body.
    ///
    /// Malformation is terminal here, before any upstream call is made.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| BaxterError::InvalidInput(format!("unparsable request body: {e}")))
    }

    /// The parsed mode tag
    pub fn mode(&self) -> Mode {
        Mode::parse(&self.mode)
    }

    /// Prompt context for template rendering
    pub fn prompt_context(&self) -> PromptContext {
        PromptContext::new(&self.user_role, &self.company_context)
    }
}
