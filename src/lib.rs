// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Baxter - AI business analyst for terminal-first product work.
//!
//! This crate exposes the runtime used by the `baxter` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `relay`: the streaming relay between the upstream completion API and
//!   the consumer; one upstream call per turn, fragments forwarded in order
//! - `llm`: backend abstraction and the OpenAI-compatible SSE client
//! - `prompts`: mode dispatch and the system prompt templates
//! - `chat`: turn orchestration and post-stream persistence
//! - `store`: SQLite chat log and project artifact records
//! - `export`: Markdown-to-paragraph mapping and DOCX packaging

pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod llm;
pub mod prompts;
pub mod relay;
pub mod store;

pub use error::{BaxterError, Result};
