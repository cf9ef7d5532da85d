// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap
//!
//! Defines all command-line arguments and subcommands for Baxter.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::prompts::ArtifactSlot;

/// Baxter - AI business analyst for your terminal
#[derive(Parser, Debug)]
#[command(name = "baxter")]
#[command(version, about = "AI business analyst for your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (default when no command given)
    Chat(ChatArgs),

    /// Run a single turn (non-interactive)
    Ask(AskArgs),

    /// Export a project artifact as DOCX
    Export(ExportArgs),

    /// Show recent chat history
    History(HistoryArgs),

    /// List project records
    Projects(ProjectsArgs),

    /// Clear chat history
    Clear,
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Initial prompt (optional)
    pub prompt: Option<String>,

    /// Perspective to assist (e.g. "Senior PM", "Tech Lead")
    #[arg(short, long)]
    pub role: Option<String>,

    /// Company/business context
    #[arg(short, long)]
    pub company: Option<String>,

    /// Mode tag for the first turn (draft, interview, stories, impact)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Model to use
    #[arg(long)]
    pub model: Option<String>,

    /// Do not persist this session
    #[arg(long)]
    pub no_persist: bool,
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug)]
pub struct AskArgs {
    /// The prompt to send
    pub prompt: String,

    /// Perspective to assist
    #[arg(short, long)]
    pub role: Option<String>,

    /// Company/business context
    #[arg(short, long)]
    pub company: Option<String>,

    /// Mode tag (draft, interview, stories, impact)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Model to use
    #[arg(long)]
    pub model: Option<String>,

    /// Do not persist this turn
    #[arg(long)]
    pub no_persist: bool,
}

/// Arguments for the export subcommand
#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Which artifact to export
    #[arg(short, long, value_enum, default_value_t = ArtifactArg::Prd)]
    pub artifact: ArtifactArg,

    /// Output path (defaults to a filename derived from the title)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Title used for the default filename
    #[arg(long)]
    pub title: Option<String>,
}

/// Artifact selector for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArtifactArg {
    /// The PRD draft
    Prd,
    /// The user-story decomposition
    Stories,
    /// The impact analysis
    Impact,
}

impl ArtifactArg {
    /// Map to the store slot
    pub fn slot(self) -> ArtifactSlot {
        match self {
            ArtifactArg::Prd => ArtifactSlot::FullPrd,
            ArtifactArg::Stories => ArtifactSlot::UserStories,
            ArtifactArg::Impact => ArtifactSlot::ImpactAnalysis,
        }
    }
}

/// Arguments for the history subcommand
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    /// Maximum rows to show
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
}

/// Arguments for the projects subcommand
#[derive(clap::Args, Debug)]
pub struct ProjectsArgs {
    /// Maximum projects to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}
