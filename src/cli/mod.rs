// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI module for Baxter
//!
//! Contains argument parsing and command-line interface logic.

pub mod args;

pub use args::{AskArgs, ChatArgs, Cli, Commands, ExportArgs, HistoryArgs, ProjectsArgs};
