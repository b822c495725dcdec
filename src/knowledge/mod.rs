//! The knowledge engine: capture, classification, tag resolution, linking,
//! hybrid search, related-block discovery, sessions, briefs, and statistics.
//!
//! Every function takes a borrowed `rusqlite::Connection` and runs to completion;
//! callers serialize access to the connection.

pub mod brief;
pub mod capture;
pub mod classify;
pub mod inspect;
pub mod link;
pub mod related;
pub mod search;
pub mod session;
pub mod stats;
pub mod tags;
pub mod types;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params_from_iter, Connection};
use std::collections::HashMap;

use types::{Category, ResultRow};

/// Length of a stored summary and of the display fallback, in characters.
pub const SUMMARY_CHARS: usize = 60;

/// Timestamp format used for every stored time: UTC, second precision, `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// `<prefix>_<unix seconds>_<8 hex>`: sorts by creation second, random within it.
pub(crate) fn generate_id(prefix: &str) -> String {
    let random = uuid::Uuid::new_v4();
    let bytes = random.as_bytes();
    format!(
        "{prefix}_{}_{:02x}{:02x}{:02x}{:02x}",
        Utc::now().timestamp(),
        bytes[0],
        bytes[1],
        bytes[2],
        bytes[3]
    )
}

/// First `max_chars` characters of `content`.
pub(crate) fn char_prefix(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// The one-line summary stored at capture: a prefix, with `...` if anything was cut.
pub(crate) fn one_line_summary(content: &str) -> String {
    let prefix = char_prefix(content, SUMMARY_CHARS);
    if prefix.len() < content.len() {
        format!("{prefix}...")
    } else {
        content.to_string()
    }
}

/// Build `?{start}, ?{start+1}, ...` for `count` parameters.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Batch-fetch display rows by id. Ids that do not exist are absent from the map.
pub(crate) fn fetch_rows(
    conn: &Connection,
    ids: &[&str],
) -> anyhow::Result<HashMap<String, ResultRow>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT b.id, b.type, b.created_at, \
         COALESCE(s.one_line, SUBSTR(b.content, 1, {SUMMARY_CHARS})) \
         FROM blocks b LEFT JOIN block_summaries s ON s.block_id = b.id \
         WHERE b.id IN ({})",
        placeholders(1, ids.len())
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(ids.iter()), |row| {
            let category: String = row.get(1)?;
            Ok(ResultRow {
                id: row.get(0)?,
                category: parse_category(1, &category)?,
                created_at: row.get(2)?,
                summary: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows.into_iter().map(|r| (r.id.clone(), r)).collect())
}

/// Fetch display rows in the order of `ids`, skipping ids with no block.
pub(crate) fn fetch_rows_ordered(conn: &Connection, ids: &[&str]) -> anyhow::Result<Vec<ResultRow>> {
    let mut found = fetch_rows(conn, ids)?;
    Ok(ids.iter().filter_map(|id| found.remove(*id)).collect())
}

/// Map a stored `type` column back to a [`Category`], as a rusqlite conversion error.
pub(crate) fn parse_category(column: usize, value: &str) -> rusqlite::Result<Category> {
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}
