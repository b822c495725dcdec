//! Capture-time auto-linking.
//!
//! A new block is linked to earlier blocks that carry any of its tags. Every link
//! gets the same confidence, a function of how many tags the new block has, not of
//! how many it shares with each candidate.

use anyhow::Result;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

use super::types::{Link, LinkKind};

/// Tag count at which link confidence saturates at 1.0.
const CONFIDENCE_SATURATION: f64 = 5.0;

/// `min(tag_count / 5, 1)`.
pub fn link_confidence(tag_count: usize) -> f64 {
    (tag_count as f64 / CONFIDENCE_SATURATION).min(1.0)
}

/// Link `block_id` to up to `max_candidates` other blocks sharing any of `tags`,
/// most recent first. Returns how many new links were written; existing
/// (source, target) auto-links are left untouched.
pub fn auto_link(
    conn: &Connection,
    block_id: &str,
    tags: &BTreeSet<String>,
    max_candidates: usize,
) -> Result<usize> {
    if tags.is_empty() || max_candidates == 0 {
        return Ok(0);
    }

    let candidates = tag_candidates(conn, block_id, tags, max_candidates)?;
    let confidence = link_confidence(tags.len());
    let now = super::now_timestamp();

    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO links (source_id, target_id, link_type, confidence, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    let mut created = 0;
    for target in &candidates {
        created += stmt.execute(params![
            block_id,
            target,
            LinkKind::Auto.as_str(),
            confidence,
            now
        ])?;
    }

    tracing::debug!(
        block = %block_id,
        candidates = candidates.len(),
        created,
        confidence,
        "auto-link pass"
    );
    Ok(created)
}

/// Blocks other than `block_id` tagged with any of `tags`.
fn tag_candidates(
    conn: &Connection,
    block_id: &str,
    tags: &BTreeSet<String>,
    limit: usize,
) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT b.id FROM blocks b \
         WHERE b.id != ?1 AND EXISTS ( \
             SELECT 1 FROM block_tags bt JOIN tags t ON t.id = bt.tag_id \
             WHERE bt.block_id = b.id AND t.name IN ({}) \
         ) \
         ORDER BY b.created_at DESC, b.id DESC LIMIT ?2",
        super::placeholders(3, tags.len())
    );

    let limit = limit as i64;
    let mut values: Vec<&dyn ToSql> = vec![&block_id, &limit];
    values.extend(tags.iter().map(|t| t as &dyn ToSql));

    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(values.as_slice(), |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(ids)
}

/// Outgoing links of a block, oldest first.
pub fn links_from(conn: &Connection, block_id: &str) -> Result<Vec<Link>> {
    let mut stmt = conn.prepare(
        "SELECT source_id, target_id, confidence, created_at FROM links \
         WHERE source_id = ?1 ORDER BY id",
    )?;
    let links = stmt
        .query_map(params![block_id], |row| {
            Ok(Link {
                source_id: row.get(0)?,
                target_id: row.get(1)?,
                kind: LinkKind::Auto,
                confidence: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(links)
}
