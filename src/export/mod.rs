// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Artifact export
//!
//! Maps a Markdown-like artifact string onto a paragraph document and packs
//! it as DOCX. Every input line becomes exactly one paragraph; `#`, `##`,
//! and `###` prefixes select Title, Heading 1, and Heading 2 paragraphs with
//! the prefix stripped.

pub mod docx;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Paragraph style in the exported document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphKind {
    /// Document title (`# ` prefix)
    Title,
    /// First-level heading (`## ` prefix)
    Heading1,
    /// Second-level heading (`### ` prefix)
    Heading2,
    /// Plain paragraph
    Body,
}

/// One paragraph of the exported document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocParagraph {
    pub kind: ParagraphKind,
    pub text: String,
}

/// Export request boundary contract
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    /// Markdown-like artifact content
    pub content: String,

    /// Title used to derive the download filename
    #[serde(default)]
    pub title: String,
}

/// Map artifact content onto paragraphs, one per input line.
pub fn paragraphs(content: &str) -> Vec<DocParagraph> {
    content
        .split('\n')
        .map(|line| {
            if let Some(text) = line.strip_prefix("### ") {
                DocParagraph {
                    kind: ParagraphKind::Heading2,
                    text: text.to_string(),
                }
            } else if let Some(text) = line.strip_prefix("## ") {
                DocParagraph {
                    kind: ParagraphKind::Heading1,
                    text: text.to_string(),
                }
            } else if let Some(text) = line.strip_prefix("# ") {
                DocParagraph {
                    kind: ParagraphKind::Title,
                    text: text.to_string(),
                }
            } else {
                DocParagraph {
                    kind: ParagraphKind::Body,
                    text: line.to_string(),
                }
            }
        })
        .collect()
}

/// Derive the download filename from a title, defaulting to PRD.docx.
///
/// Path separators are stripped so a title can never escape the target
/// directory.
pub fn export_filename(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .filter(|c| !matches!(c, '/' | '\\'))
        .collect();
    if cleaned.is_empty() {
        "PRD.docx".to_string()
    } else {
        format!("{cleaned}.docx")
    }
}

/// Build the DOCX bytes for an artifact.
pub fn export_docx(content: &str) -> Result<Vec<u8>> {
    docx::write_docx(&paragraphs(content))
}
