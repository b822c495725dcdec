//! Write path for new blocks.
//!
//! [`capture`] classifies, tags, and persists a block. Everything it writes
//! (block, FTS row, tags, people, projects, summary, embedding, auto-links, and
//! the per-day counter) commits in one transaction or not at all.

use anyhow::{ensure, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use std::collections::BTreeSet;

use super::session::SessionState;
use super::tags::AliasTable;
use super::types::Category;
use super::{classify, link};
use crate::config::CoeusConfig;
use crate::db::migrations;
use crate::embedding::{embedding_to_bytes, SemanticCapability};

/// Input to [`capture`].
#[derive(Debug, Clone, Default)]
pub struct CaptureRequest {
    pub content: String,
    /// Explicit category; inferred from the content when `None`.
    pub category: Option<Category>,
    /// Explicit tags; extracted from `#hashtags` when `None`. `Some(vec![])` means none.
    pub tags: Option<Vec<String>>,
    pub people: Vec<String>,
    pub projects: Vec<String>,
}

impl CaptureRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

/// Capture knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub max_link_candidates: usize,
    pub embed_categories: Vec<Category>,
}

impl CaptureSettings {
    pub fn from_config(config: &CoeusConfig) -> Self {
        Self {
            max_link_candidates: config.linking.max_candidates,
            embed_categories: config.capture.embed_categories.clone(),
        }
    }

    fn embeds(&self, category: Category) -> bool {
        self.embed_categories.contains(&category)
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from_config(&CoeusConfig::default())
    }
}

#[derive(Debug, Serialize)]
pub struct CaptureResult {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    /// Canonical tags, sorted.
    pub tags: Vec<String>,
    pub links_created: usize,
    /// `true` if an embedding was stored for the block.
    pub embedded: bool,
}

pub fn capture(
    conn: &mut Connection,
    semantic: &SemanticCapability,
    session: &mut SessionState,
    request: CaptureRequest,
    settings: &CaptureSettings,
) -> Result<CaptureResult> {
    let content = request.content.as_str();
    ensure!(!content.trim().is_empty(), "block content must not be empty");

    let category = request
        .category
        .unwrap_or_else(|| classify::infer_type(content));
    let raw_tags = request
        .tags
        .unwrap_or_else(|| classify::extract_tags(content));

    let wants_embedding = settings.embeds(category);
    let embedding = if wants_embedding {
        semantic.encode(content)
    } else {
        None
    };

    let created = Utc::now();
    let now = super::format_timestamp(created);
    let id = super::generate_id("b");

    let tx = conn.transaction()?;

    let aliases = AliasTable::load(&tx)?;
    let tags: BTreeSet<String> = raw_tags
        .iter()
        .map(|t| aliases.resolve(t.trim().trim_start_matches('#')))
        .filter(|t| !t.is_empty())
        .collect();

    drop_stale_session(&tx, session)?;
    let rowid = insert_block(&tx, &id, &now, category, content, session.current_session_id.as_deref())?;
    insert_fts(&tx, rowid, content, &id)?;

    for tag in &tags {
        attach_name(&tx, NameTable::Tags, &id, tag)?;
    }
    for person in names(&request.people) {
        attach_name(&tx, NameTable::People, &id, person)?;
    }
    for project in names(&request.projects) {
        attach_name(&tx, NameTable::Projects, &id, project)?;
    }

    if wants_embedding {
        tx.execute(
            "INSERT INTO block_summaries (block_id, one_line, generated_at) VALUES (?1, ?2, ?3)",
            params![id, super::one_line_summary(content), now],
        )?;
    }
    if let Some(vector) = &embedding {
        tx.execute(
            "INSERT INTO block_embeddings (block_id, embedding) VALUES (?1, ?2)",
            params![id, embedding_to_bytes(vector)],
        )?;
        if let Some(model) = semantic.model() {
            if migrations::record_embedding_model(&tx, model)? {
                tracing::info!(model = %model, "embedding model recorded");
            }
        }
    }

    let links_created = link::auto_link(&tx, &id, &tags, settings.max_link_candidates)?;

    tx.execute(
        "INSERT INTO capture_days (date, block_count) VALUES (?1, 1) \
         ON CONFLICT(date) DO UPDATE SET block_count = block_count + 1",
        params![created.format("%Y-%m-%d").to_string()],
    )?;

    tx.commit()?;

    session.last_capture_block_id = Some(id.clone());

    tracing::info!(
        block = %id,
        category = %category,
        tags = tags.len(),
        links = links_created,
        embedded = embedding.is_some(),
        "block captured"
    );

    Ok(CaptureResult {
        id,
        category,
        tags: tags.into_iter().collect(),
        links_created,
        embedded: embedding.is_some(),
    })
}

/// Forget a session id the database does not know, e.g. after switching
/// databases under the same state file.
fn drop_stale_session(tx: &Transaction, session: &mut SessionState) -> Result<()> {
    let Some(session_id) = session.current_session_id.as_deref() else {
        return Ok(());
    };
    let known: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM capture_sessions WHERE id = ?1)",
        params![session_id],
        |row| row.get(0),
    )?;
    if !known {
        tracing::warn!(session = %session_id, "capture session not in database; capturing without it");
        session.current_session_id = None;
        session.capture_mode = false;
    }
    Ok(())
}

/// Insert the block row. Returns its rowid for the FTS sync.
fn insert_block(
    tx: &Transaction,
    id: &str,
    now: &str,
    category: Category,
    content: &str,
    session_id: Option<&str>,
) -> Result<i64> {
    tx.execute(
        "INSERT INTO blocks (id, created_at, updated_at, type, content, session_id) \
         VALUES (?1, ?2, ?2, ?3, ?4, ?5)",
        params![id, now, category.as_str(), content, session_id],
    )?;
    Ok(tx.last_insert_rowid())
}

/// `blocks_fts` is external-content; its rowid must match the `blocks` row.
fn insert_fts(tx: &Transaction, rowid: i64, content: &str, id: &str) -> Result<()> {
    tx.execute(
        "INSERT INTO blocks_fts (rowid, content, id) VALUES (?1, ?2, ?3)",
        params![rowid, content, id],
    )?;
    Ok(())
}

#[derive(Clone, Copy)]
enum NameTable {
    Tags,
    People,
    Projects,
}

impl NameTable {
    fn sql(self) -> (&'static str, &'static str) {
        match self {
            Self::Tags => (
                "INSERT OR IGNORE INTO tags (name) VALUES (?1)",
                "INSERT OR IGNORE INTO block_tags (block_id, tag_id) \
                 SELECT ?1, id FROM tags WHERE name = ?2",
            ),
            Self::People => (
                "INSERT OR IGNORE INTO people (name) VALUES (?1)",
                "INSERT OR IGNORE INTO block_people (block_id, person_id) \
                 SELECT ?1, id FROM people WHERE name = ?2",
            ),
            Self::Projects => (
                "INSERT OR IGNORE INTO projects (name) VALUES (?1)",
                "INSERT OR IGNORE INTO block_projects (block_id, project_id) \
                 SELECT ?1, id FROM projects WHERE name = ?2",
            ),
        }
    }
}

/// Upsert `name` into a lookup table and join it to the block.
fn attach_name(tx: &Transaction, table: NameTable, block_id: &str, name: &str) -> Result<()> {
    let (upsert, join) = table.sql();
    tx.execute(upsert, params![name])?;
    tx.execute(join, params![block_id, name])?;
    Ok(())
}

fn names(raw: &[String]) -> impl Iterator<Item = &str> {
    raw.iter().map(|n| n.trim()).filter(|n| !n.is_empty())
}
