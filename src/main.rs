// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Baxter - AI business analyst for your terminal
//!
//! Entry point for the Baxter CLI application.

use std::io::{self, Write};

use clap::Parser;
use futures::StreamExt;

use baxter::chat::engine::{ensure_project, record_artifact, record_turn};
use baxter::chat::{TurnEngine, TurnRequest};
use baxter::cli::{AskArgs, ChatArgs, Cli, Commands, ExportArgs, HistoryArgs, ProjectsArgs};
use baxter::config::Settings;
use baxter::error::Result;
use baxter::export;
use baxter::llm::factory::BackendFactory;
use baxter::llm::message::Message;
use baxter::prompts::{Mode, DRAFT_NOW_PROMPT, GAP_ANALYSIS_PROMPT};
use baxter::relay::{RelayOptions, TurnAccumulator};
use baxter::store::ChatStore;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // Practical debug toggle: `-v` enables turn diagnostics without requiring
    // users to know target names up front. `RUST_LOG` still takes precedence.
    if cli.verbose > 0 {
        if let Ok(parsed) = "baxter=debug".parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let settings = Settings::load()?;
    Settings::ensure_directories()?;

    match cli.command {
        None => run_chat(ChatArgs::default(), settings).await?,
        Some(Commands::Chat(args)) => run_chat(args, settings).await?,
        Some(Commands::Ask(args)) => run_ask(args, settings).await?,
        Some(Commands::Export(args)) => run_export(args, settings)?,
        Some(Commands::History(args)) => run_history(args, settings)?,
        Some(Commands::Projects(args)) => run_projects(args, settings)?,
        Some(Commands::Clear) => run_clear(settings)?,
    }

    Ok(())
}

/// Run interactive chat mode
async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    let backend = BackendFactory::create(&settings)?;
    let mut options = RelayOptions::from_settings(&settings);
    if let Some(model) = args.model {
        options = options.with_model(model);
    }
    let engine = TurnEngine::new(backend, options);

    let mut store = open_store(&settings, args.no_persist);

    let user_role = args
        .role
        .unwrap_or_else(|| settings.defaults.user_role.clone());
    let company = args
        .company
        .unwrap_or_else(|| settings.defaults.company_context.clone());
    let mode_tag = args.mode.unwrap_or_default();

    print_welcome(&user_role);

    let mut messages: Vec<Message> = Vec::new();
    let mut pending = args.prompt;

    loop {
        let input = match pending.take() {
            Some(prompt) => prompt,
            None => read_user_input()?,
        };
        let input = input.trim().to_string();
        if input.is_empty() {
            continue;
        }

        // Slash commands
        let (prompt_text, turn_mode) = if input == "/quit" || input == "/exit" {
            break;
        } else if input == "/help" {
            print_help();
            continue;
        } else if input == "/clear" {
            messages.clear();
            println!("Conversation cleared.");
            continue;
        } else if input == "/draft" {
            (DRAFT_NOW_PROMPT.to_string(), "draft".to_string())
        } else if input == "/gap" {
            (GAP_ANALYSIS_PROMPT.to_string(), "impact".to_string())
        } else if input.starts_with('/') {
            println!("Unknown command: {input}. Try /help.");
            continue;
        } else {
            (input, mode_tag.clone())
        };

        messages.push(Message::user(&prompt_text));
        let request = TurnRequest::new(messages.clone(), &user_role, &company, &turn_mode);

        match run_streaming_turn(&engine, &request).await {
            Some(assistant_text) => {
                messages.push(Message::assistant(&assistant_text));
                persist_turn(store.as_mut(), &prompt_text, &turn_mode, &assistant_text);
            }
            // Failed turns stay in the transcript so the user can resubmit,
            // but nothing is persisted.
            None => continue,
        }
    }

    Ok(())
}

/// Run a single non-interactive turn
async fn run_ask(args: AskArgs, settings: Settings) -> Result<()> {
    let backend = BackendFactory::create(&settings)?;
    let mut options = RelayOptions::from_settings(&settings);
    if let Some(model) = args.model {
        options = options.with_model(model);
    }
    let engine = TurnEngine::new(backend, options);

    let user_role = args
        .role
        .unwrap_or_else(|| settings.defaults.user_role.clone());
    let company = args
        .company
        .unwrap_or_else(|| settings.defaults.company_context.clone());
    let mode_tag = args.mode.unwrap_or_default();

    let request = TurnRequest::new(
        vec![Message::user(&args.prompt)],
        &user_role,
        &company,
        &mode_tag,
    );

    match run_streaming_turn(&engine, &request).await {
        Some(assistant_text) => {
            let mut store = open_store(&settings, args.no_persist);
            persist_turn(store.as_mut(), &args.prompt, &mode_tag, &assistant_text);
            Ok(())
        }
        None => std::process::exit(1),
    }
}

/// Stream one turn to stdout; returns the full text on success, None on a
/// failed turn (already reported to the user).
async fn run_streaming_turn(engine: &TurnEngine, request: &TurnRequest) -> Option<String> {
    let mut stream = match engine.stream_turn(request).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("error: {e}");
            return None;
        }
    };

    let mut accumulator = TurnAccumulator::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(fragment) => {
                print!("{fragment}");
                let _ = io::stdout().flush();
                accumulator.push(&fragment);
            }
            Err(e) => {
                // Terminal for this turn: the partial text must not be
                // treated as a complete assistant message.
                println!();
                eprintln!("error: {e}");
                return None;
            }
        }
    }
    println!();

    Some(accumulator.finish())
}

/// Open the store unless persistence is disabled; a store that cannot be
/// opened downgrades to a warning, never a failed session.
fn open_store(settings: &Settings, no_persist: bool) -> Option<ChatStore> {
    if no_persist {
        return None;
    }
    match ChatStore::open(settings.database_path()) {
        Ok(store) => Some(store),
        Err(e) => {
            tracing::warn!(error = %e, "persistence disabled for this session");
            None
        }
    }
}

/// Persist a completed turn and its artifact slot. Failures are warnings on
/// the store's own channel; the generated turn remains valid.
fn persist_turn(
    store: Option<&mut ChatStore>,
    prompt_text: &str,
    mode_tag: &str,
    assistant_text: &str,
) {
    let Some(store) = store else {
        return;
    };

    if let Err(e) = record_turn(store, prompt_text, assistant_text) {
        tracing::warn!(error = %e, "failed to persist chat turn");
    }

    match ensure_project(store, prompt_text) {
        Ok(project) => {
            if let Err(e) =
                record_artifact(store, project.id, Mode::parse(mode_tag), assistant_text)
            {
                tracing::warn!(error = %e, "failed to persist artifact");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to load project record"),
    }
}

/// Export a project artifact as DOCX
fn run_export(args: ExportArgs, settings: Settings) -> Result<()> {
    let store = ChatStore::open(settings.database_path())?;
    let project = store
        .latest_project()?
        .ok_or_else(|| baxter::BaxterError::Export("no project recorded yet".to_string()))?;

    let slot = args.artifact.slot();
    let content = project.artifact(slot).ok_or_else(|| {
        baxter::BaxterError::Export(format!(
            "artifact '{:?}' has not been generated yet",
            args.artifact
        ))
    })?;

    let title = args.title.unwrap_or_else(|| project.title.clone());
    let path = args
        .output
        .unwrap_or_else(|| export::export_filename(&title).into());

    let bytes = export::export_docx(content)?;
    std::fs::write(&path, bytes)?;
    println!("Exported {}", path.display());

    Ok(())
}

/// Show recent chat history
fn run_history(args: HistoryArgs, settings: Settings) -> Result<()> {
    let store = ChatStore::open(settings.database_path())?;
    let rows = store.recent_messages(args.limit)?;

    if rows.is_empty() {
        println!("No chat history.");
        return Ok(());
    }

    for row in rows {
        let mut preview = row.content.replace('\n', " ");
        if preview.chars().count() > 120 {
            preview = preview.chars().take(117).collect::<String>() + "...";
        }
        println!(
            "{} [{}] {}",
            row.created_at.format("%Y-%m-%d %H:%M"),
            row.role,
            preview
        );
    }

    Ok(())
}

/// List project records
fn run_projects(args: ProjectsArgs, settings: Settings) -> Result<()> {
    let store = ChatStore::open(settings.database_path())?;
    let projects = store.list_projects(args.limit)?;

    if projects.is_empty() {
        println!("No projects recorded yet.");
        return Ok(());
    }

    for project in projects {
        let slots = [
            ("prd", project.full_prd.is_some()),
            ("stories", project.user_stories.is_some()),
            ("impact", project.impact_analysis.is_some()),
        ];
        let available: Vec<&str> = slots
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| *name)
            .collect();

        println!(
            "{}  {}  [{}]  updated {}",
            project.id,
            project.title,
            available.join(", "),
            project.updated_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

/// Clear chat history
fn run_clear(settings: Settings) -> Result<()> {
    let store = ChatStore::open(settings.database_path())?;
    let removed = store.clear_chat()?;
    println!("Removed {removed} chat rows.");
    Ok(())
}

fn print_welcome(user_role: &str) {
    println!("Baxter - AI business analyst (helping a {user_role})");
    println!("Describe a feature idea, or /help for commands.");
    println!();
}

fn print_help() {
    println!("Commands:");
    println!("  /draft   Generate a comprehensive PRD from the discussion so far");
    println!("  /gap     Run a CPO-level gap analysis on the current requirement");
    println!("  /clear   Clear the in-session conversation");
    println!("  /quit    Exit");
}

/// Read one line of user input; EOF quits.
fn read_user_input() -> Result<String> {
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    let bytes = io::stdin().read_line(&mut input)?;
    if bytes == 0 {
        return Ok("/quit".to_string());
    }
    Ok(input)
}
