//! SQL DDL for the knowledge base.
//!
//! `blocks` holds captured notes; `blocks_fts` (FTS5, external content) indexes
//! their text; `block_embeddings` (vec0) holds one vector per block. Tags, people,
//! and projects are many-to-many side tables. All DDL uses `IF NOT EXISTS`.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS blocks (
    id TEXT PRIMARY KEY,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    type TEXT NOT NULL CHECK(type IN ('work_log','journal','idea','research')),
    content TEXT NOT NULL,
    session_id TEXT REFERENCES capture_sessions(id)
);

CREATE INDEX IF NOT EXISTS idx_blocks_created ON blocks(created_at);
CREATE INDEX IF NOT EXISTS idx_blocks_type ON blocks(type);
CREATE INDEX IF NOT EXISTS idx_blocks_session ON blocks(session_id);

-- Exact-match index over block content
CREATE VIRTUAL TABLE IF NOT EXISTS blocks_fts USING fts5(
    content,
    id UNINDEXED,
    content='blocks',
    content_rowid='rowid'
);

CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS block_tags (
    block_id TEXT NOT NULL REFERENCES blocks(id),
    tag_id INTEGER NOT NULL REFERENCES tags(id),
    PRIMARY KEY (block_id, tag_id)
);

CREATE INDEX IF NOT EXISTS idx_block_tags_tag ON block_tags(tag_id);

CREATE TABLE IF NOT EXISTS tag_aliases (
    alias TEXT PRIMARY KEY,
    canonical TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS people (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS block_people (
    block_id TEXT NOT NULL REFERENCES blocks(id),
    person_id INTEGER NOT NULL REFERENCES people(id),
    PRIMARY KEY (block_id, person_id)
);

CREATE TABLE IF NOT EXISTS projects (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS block_projects (
    block_id TEXT NOT NULL REFERENCES blocks(id),
    project_id INTEGER NOT NULL REFERENCES projects(id),
    PRIMARY KEY (block_id, project_id)
);

-- Directed links; one row per (source, target, kind)
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id TEXT NOT NULL REFERENCES blocks(id),
    target_id TEXT NOT NULL REFERENCES blocks(id),
    link_type TEXT NOT NULL CHECK(link_type IN ('auto')),
    confidence REAL NOT NULL CHECK(confidence >= 0.0 AND confidence <= 1.0),
    created_at TEXT NOT NULL,
    UNIQUE (source_id, target_id, link_type)
);

CREATE INDEX IF NOT EXISTS idx_links_source ON links(source_id);

CREATE TABLE IF NOT EXISTS block_summaries (
    block_id TEXT PRIMARY KEY REFERENCES blocks(id),
    one_line TEXT NOT NULL,
    generated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS capture_sessions (
    id TEXT PRIMARY KEY,
    started_at TEXT NOT NULL,
    ended_at TEXT,
    mode TEXT NOT NULL CHECK(mode IN ('batch')),
    block_count INTEGER
);

CREATE TABLE IF NOT EXISTS capture_days (
    date TEXT PRIMARY KEY,
    block_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// vec0 virtual table must be created separately (sqlite-vec syntax).
const VEC_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS block_embeddings USING vec0(
    block_id TEXT PRIMARY KEY,
    embedding FLOAT[384]
);
"#;

/// Initialize all schema tables. Idempotent.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VEC_TABLE_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
