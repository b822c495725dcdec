//! Knowledge-base statistics.

use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;

use super::session::SessionState;
use super::types::Category;
use crate::embedding::SemanticCapability;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_blocks: u64,
    /// Every category, zero-filled.
    pub by_type: BTreeMap<Category, u64>,
    pub tags: u64,
    pub links: u64,
    pub sessions: u64,
    pub embeddings: u64,
    pub has_semantic: bool,
    pub capture_mode: bool,
}

pub fn stats(
    conn: &Connection,
    semantic: &SemanticCapability,
    state: &SessionState,
) -> Result<StatsResponse> {
    let mut by_type: BTreeMap<Category, u64> = Category::ALL.iter().map(|c| (*c, 0)).collect();
    let mut stmt = conn.prepare("SELECT type, COUNT(*) FROM blocks GROUP BY type")?;
    let rows = stmt
        .query_map([], |row| {
            let category: String = row.get(0)?;
            Ok((super::parse_category(0, &category)?, row.get::<_, i64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (category, count) in rows {
        by_type.insert(category, count as u64);
    }

    Ok(StatsResponse {
        total_blocks: by_type.values().sum(),
        by_type,
        tags: count_rows(conn, "tags")?,
        links: count_rows(conn, "links")?,
        sessions: count_rows(conn, "capture_sessions")?,
        embeddings: count_rows(conn, "block_embeddings")?,
        has_semantic: semantic.is_available(),
        capture_mode: state.capture_mode,
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
    Ok(n as u64)
}
