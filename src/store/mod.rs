// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Persistent storage for chat history and project artifacts
//!
//! SQLite-backed. The chat log is append-only: rows are only ever inserted
//! per completed turn, never updated. Project records are upsert-able and
//! keyed by a UUID assigned on first insert. All operations return
//! `StoreError` so persistence failures stay on their own channel and are
//! never mistaken for a failed generation.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::StoreError;
use crate::llm::message::Role;
use crate::prompts::ArtifactSlot;

/// Parse a UUID from a database string, converting errors to rusqlite errors
fn parse_uuid_from_db(id: &str, column: usize) -> std::result::Result<Uuid, rusqlite::Error> {
    Uuid::parse_str(id).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a DateTime from a database RFC3339 string, converting errors to rusqlite errors
fn parse_datetime_from_db(
    timestamp: &str,
    column: usize,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

/// One persisted chat log row
#[derive(Debug, Clone)]
pub struct ChatRow {
    /// Monotonic row id (insertion order)
    pub id: i64,
    /// Message role
    pub role: Role,
    /// Message content
    pub content: String,
    /// When the row was written
    pub created_at: DateTime<Utc>,
}

/// A project record holding the generated artifacts
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    /// Opaque identifier, assigned on first insert
    pub id: Uuid,
    /// Project title
    pub title: String,
    /// Latest PRD draft
    pub full_prd: Option<String>,
    /// Latest user-story decomposition
    pub user_stories: Option<String>,
    /// Latest impact analysis
    pub impact_analysis: Option<String>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Create a new record with a fresh id and no artifacts
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            full_prd: None,
            user_stories: None,
            impact_analysis: None,
            updated_at: Utc::now(),
        }
    }

    /// Get the artifact stored in a slot
    pub fn artifact(&self, slot: ArtifactSlot) -> Option<&str> {
        match slot {
            ArtifactSlot::FullPrd => self.full_prd.as_deref(),
            ArtifactSlot::UserStories => self.user_stories.as_deref(),
            ArtifactSlot::ImpactAnalysis => self.impact_analysis.as_deref(),
        }
    }
}

/// SQLite store for chat history and project records
pub struct ChatStore {
    conn: Connection,
}

impl ChatStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> std::result::Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Open(e.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open an in-memory store (tests)
    pub fn open_in_memory() -> std::result::Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Open(e.to_string()))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_schema(&self) -> std::result::Result<(), StoreError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS chat_log (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    role TEXT NOT NULL,
                    content TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )",
                [],
            )
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS projects (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    full_prd TEXT,
                    user_stories TEXT,
                    impact_analysis TEXT,
                    updated_at TEXT NOT NULL
                )",
                [],
            )
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        Ok(())
    }

    /// Append one message row to the chat log
    pub fn append_message(
        &self,
        role: Role,
        content: &str,
    ) -> std::result::Result<i64, StoreError> {
        self.conn
            .execute(
                "INSERT INTO chat_log (role, content, created_at) VALUES (?1, ?2, ?3)",
                params![role.to_string(), content, Utc::now().to_rfc3339()],
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Append a completed turn (user message + assistant reply) atomically
    pub fn append_turn(
        &mut self,
        user_content: &str,
        assistant_content: &str,
    ) -> std::result::Result<(), StoreError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let now = Utc::now().to_rfc3339();
        tx.execute(
            "INSERT INTO chat_log (role, content, created_at) VALUES (?1, ?2, ?3)",
            params![Role::User.to_string(), user_content, now],
        )
        .map_err(|e| StoreError::Write(e.to_string()))?;
        tx.execute(
            "INSERT INTO chat_log (role, content, created_at) VALUES (?1, ?2, ?3)",
            params![Role::Assistant.to_string(), assistant_content, now],
        )
        .map_err(|e| StoreError::Write(e.to_string()))?;
        tx.commit().map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    /// Get the most recent chat rows, oldest first
    pub fn recent_messages(
        &self,
        limit: usize,
    ) -> std::result::Result<Vec<ChatRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, role, content, created_at FROM (
                    SELECT id, role, content, created_at
                    FROM chat_log ORDER BY id DESC LIMIT ?1
                ) ORDER BY id ASC",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit], |row| {
                let id: i64 = row.get(0)?;
                let role: String = row.get(1)?;
                let content: String = row.get(2)?;
                let created_at: String = row.get(3)?;

                let role = Role::from_str(&role).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        1,
                        rusqlite::types::Type::Text,
                        e.into(),
                    )
                })?;

                Ok(ChatRow {
                    id,
                    role,
                    content,
                    created_at: parse_datetime_from_db(&created_at, 3)?,
                })
            })
            .map_err(|e| StoreError::Query(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(rows)
    }

    /// Delete all chat log rows, returning the number removed
    pub fn clear_chat(&self) -> std::result::Result<usize, StoreError> {
        self.conn
            .execute("DELETE FROM chat_log", [])
            .map_err(|e| StoreError::Write(e.to_string()))
    }

    /// Insert or replace a project record
    pub fn upsert_project(&self, project: &ProjectRecord) -> std::result::Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO projects
                (id, title, full_prd, user_stories, impact_analysis, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    project.id.to_string(),
                    project.title,
                    project.full_prd,
                    project.user_stories,
                    project.impact_analysis,
                    project.updated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    /// Write one artifact slot of a project and bump its updated_at
    pub fn set_artifact(
        &self,
        id: Uuid,
        slot: ArtifactSlot,
        content: &str,
    ) -> std::result::Result<(), StoreError> {
        let sql = match slot {
            ArtifactSlot::FullPrd => {
                "UPDATE projects SET full_prd = ?1, updated_at = ?2 WHERE id = ?3"
            }
            ArtifactSlot::UserStories => {
                "UPDATE projects SET user_stories = ?1, updated_at = ?2 WHERE id = ?3"
            }
            ArtifactSlot::ImpactAnalysis => {
                "UPDATE projects SET impact_analysis = ?1, updated_at = ?2 WHERE id = ?3"
            }
        };

        let updated = self
            .conn
            .execute(
                sql,
                params![content, Utc::now().to_rfc3339(), id.to_string()],
            )
            .map_err(|e| StoreError::Write(e.to_string()))?;

        if updated == 0 {
            return Err(StoreError::Write(format!("no project with id {id}")));
        }
        Ok(())
    }

    /// Get a project record by id
    pub fn get_project(
        &self,
        id: Uuid,
    ) -> std::result::Result<Option<ProjectRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, full_prd, user_stories, impact_analysis, updated_at
                FROM projects WHERE id = ?1",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![id.to_string()], Self::map_project_row)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .filter_map(|r| r.ok());

        Ok(rows.next())
    }

    /// Get the most recently updated project record
    pub fn latest_project(&self) -> std::result::Result<Option<ProjectRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, full_prd, user_stories, impact_analysis, updated_at
                FROM projects ORDER BY updated_at DESC LIMIT 1",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut rows = stmt
            .query_map([], Self::map_project_row)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .filter_map(|r| r.ok());

        Ok(rows.next())
    }

    /// List project records, most recently updated first
    pub fn list_projects(
        &self,
        limit: usize,
    ) -> std::result::Result<Vec<ProjectRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, full_prd, user_stories, impact_analysis, updated_at
                FROM projects ORDER BY updated_at DESC LIMIT ?1",
            )
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let projects = stmt
            .query_map(params![limit], Self::map_project_row)
            .map_err(|e| StoreError::Query(e.to_string()))?
            .filter_map(|r| r.ok())
            .collect();

        Ok(projects)
    }

    fn map_project_row(row: &rusqlite::Row<'_>) -> std::result::Result<ProjectRecord, rusqlite::Error> {
        let id: String = row.get(0)?;
        let title: String = row.get(1)?;
        let full_prd: Option<String> = row.get(2)?;
        let user_stories: Option<String> = row.get(3)?;
        let impact_analysis: Option<String> = row.get(4)?;
        let updated_at: String = row.get(5)?;

        Ok(ProjectRecord {
            id: parse_uuid_from_db(&id, 0)?,
            title,
            full_prd,
            user_stories,
            impact_analysis,
            updated_at: parse_datetime_from_db(&updated_at, 5)?,
        })
    }
}
