//! Hybrid search: exact match first, semantic fallback when exact hits are sparse.
//!
//! Stage one ranks FTS5 matches. If it returns fewer than [`SEMANTIC_FALLBACK_BELOW`]
//! rows and semantic search is available, the query is embedded and blocks with
//! cosine similarity above [`SIMILARITY_THRESHOLD`] are appended behind the exact
//! hits, skipping ids already present.

use anyhow::Result;
use rusqlite::{params, Connection};
use std::collections::HashSet;

use super::types::ResultRow;
use crate::embedding::{embedding_to_bytes, SemanticCapability};

/// Exact-match result counts below this trigger the semantic stage.
pub const SEMANTIC_FALLBACK_BELOW: usize = 3;

/// Minimum cosine similarity (exclusive) for a semantic match.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Whether a cosine distance is close enough to count as a semantic match.
pub fn is_semantic_match(distance: f64) -> bool {
    1.0 - distance > SIMILARITY_THRESHOLD
}

pub fn search(
    conn: &Connection,
    semantic: &SemanticCapability,
    query: &str,
    limit: usize,
) -> Result<Vec<ResultRow>> {
    let exact = exact_search(conn, query, limit)?;

    if exact.len() >= SEMANTIC_FALLBACK_BELOW || !semantic.is_available() {
        tracing::debug!(query = %query, exact = exact.len(), "search answered by exact match");
        return Ok(exact);
    }

    let Some(query_embedding) = semantic.encode(query) else {
        return Ok(exact);
    };

    let neighbours = nearest_blocks(conn, &query_embedding, None, limit)?;
    let ids: Vec<&str> = neighbours.iter().map(|(id, _)| id.as_str()).collect();
    let similar = super::fetch_rows_ordered(conn, &ids)?;

    tracing::debug!(
        query = %query,
        exact = exact.len(),
        semantic = similar.len(),
        "search used semantic fallback"
    );
    Ok(fuse_results(exact, similar, limit))
}

/// Exact hits in order, then unseen semantic hits in order, truncated to `limit`.
pub fn fuse_results(exact: Vec<ResultRow>, semantic: Vec<ResultRow>, limit: usize) -> Vec<ResultRow> {
    let mut seen: HashSet<String> = HashSet::new();
    exact
        .into_iter()
        .chain(semantic)
        .filter(|row| seen.insert(row.id.clone()))
        .take(limit)
        .collect()
}

/// FTS5 matches ordered by rank, hydrated into display rows.
pub fn exact_search(conn: &Connection, query: &str, limit: usize) -> Result<Vec<ResultRow>> {
    let escaped = escape_fts_query(query);
    if escaped.is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare(
        "SELECT id FROM blocks_fts WHERE blocks_fts MATCH ?1 ORDER BY rank LIMIT ?2",
    )?;
    let ids = stmt
        .query_map(params![escaped, limit as i64], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    super::fetch_rows_ordered(conn, &refs)
}

/// Ids of embedded blocks within the similarity threshold of `embedding`, closest
/// first, with their cosine distance. `exclude` drops one id (the source block).
pub(crate) fn nearest_blocks(
    conn: &Connection,
    embedding: &[f32],
    exclude: Option<&str>,
    limit: usize,
) -> Result<Vec<(String, f64)>> {
    let max_distance = 1.0 - SIMILARITY_THRESHOLD;
    let mut stmt = conn.prepare(
        "SELECT block_id, vec_distance_cosine(embedding, ?1) AS distance \
         FROM block_embeddings \
         WHERE vec_distance_cosine(embedding, ?1) <= ?2 \
         ORDER BY distance, block_id",
    )?;
    let rows = stmt
        .query_map(params![embedding_to_bytes(embedding), max_distance], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter(|(id, distance)| Some(id.as_str()) != exclude && is_semantic_match(*distance))
        .take(limit)
        .collect())
}

/// Quote every whitespace-separated word so user text is never parsed as FTS5
/// syntax. Words are ANDed.
fn escape_fts_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|word| word.replace('"', ""))
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{word}\""))
        .collect::<Vec<_>>()
        .join(" ")
}
