//! Related-block discovery for a given block id.
//!
//! Two neighbour sets are fused: blocks sharing at least one tag (score 1.0) and
//! blocks whose stored embedding is within the similarity threshold (score
//! `1 - distance`). A block found both ways is boosted by [`OVERLAP_BOOST`] and
//! reported once with source [`MatchSource::Both`].

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use super::search::nearest_blocks;
use super::types::{MatchSource, ScoredRow};
use crate::embedding::{embedding_from_bytes, SemanticCapability};

/// Score of every tag-match row.
pub const TAG_MATCH_SCORE: f64 = 1.0;

/// Added to a row found by both tag overlap and similarity.
pub const OVERLAP_BOOST: f64 = 0.2;

pub fn find_related(
    conn: &Connection,
    semantic: &SemanticCapability,
    block_id: &str,
    limit: usize,
) -> Result<Vec<ScoredRow>> {
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM blocks WHERE id = ?1", params![block_id], |row| row.get(0))
        .optional()?;
    if exists.is_none() {
        tracing::debug!(block = %block_id, "related lookup for unknown block");
        return Ok(Vec::new());
    }

    let tag_matches = tag_matches(conn, block_id, limit)?;
    if !semantic.is_available() {
        return Ok(tag_matches);
    }

    let similar = semantic_matches(conn, block_id, limit)?;
    tracing::debug!(
        block = %block_id,
        tag_matches = tag_matches.len(),
        semantic = similar.len(),
        "related sets fused"
    );
    Ok(fuse_related(tag_matches, similar, limit))
}

/// Merge semantic rows into the tag-match rows.
///
/// New ids are appended as-is. An id already present gets `+0.2` (capped at 1.0)
/// and becomes [`MatchSource::Both`]. The result is stably sorted by score,
/// highest first, and cut to `limit`.
pub fn fuse_related(tag: Vec<ScoredRow>, semantic: Vec<ScoredRow>, limit: usize) -> Vec<ScoredRow> {
    let mut fused = tag;
    let mut positions: HashMap<String, usize> = fused
        .iter()
        .enumerate()
        .map(|(i, r)| (r.row.id.clone(), i))
        .collect();

    for row in semantic {
        match positions.get(&row.row.id) {
            Some(&i) => {
                let existing = &mut fused[i];
                existing.score = (existing.score + OVERLAP_BOOST).min(1.0);
                existing.source = MatchSource::Both;
            }
            None => {
                positions.insert(row.row.id.clone(), fused.len());
                fused.push(row);
            }
        }
    }

    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused.truncate(limit);
    fused
}

/// Other blocks sharing any tag with `block_id`, most recent first.
fn tag_matches(conn: &Connection, block_id: &str, limit: usize) -> Result<Vec<ScoredRow>> {
    let mut stmt = conn.prepare(
        "SELECT b.id FROM blocks b \
         WHERE b.id != ?1 AND EXISTS ( \
             SELECT 1 FROM block_tags mine \
             JOIN block_tags theirs ON theirs.tag_id = mine.tag_id \
             WHERE mine.block_id = ?1 AND theirs.block_id = b.id \
         ) \
         ORDER BY b.created_at DESC, b.id DESC LIMIT ?2",
    )?;
    let ids = stmt
        .query_map(params![block_id, limit as i64], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    Ok(super::fetch_rows_ordered(conn, &refs)?
        .into_iter()
        .map(|row| ScoredRow {
            row,
            score: TAG_MATCH_SCORE,
            source: MatchSource::TagMatch,
        })
        .collect())
}

/// Blocks similar to `block_id`'s stored embedding. Empty if it has none.
fn semantic_matches(conn: &Connection, block_id: &str, limit: usize) -> Result<Vec<ScoredRow>> {
    let blob: Option<Vec<u8>> = conn
        .query_row(
            "SELECT embedding FROM block_embeddings WHERE block_id = ?1",
            params![block_id],
            |row| row.get(0),
        )
        .optional()?;
    let Some(blob) = blob else {
        return Ok(Vec::new());
    };

    let neighbours = nearest_blocks(conn, &embedding_from_bytes(&blob), Some(block_id), limit)?;
    let ids: Vec<&str> = neighbours.iter().map(|(id, _)| id.as_str()).collect();
    let mut rows = super::fetch_rows(conn, &ids)?;

    Ok(neighbours
        .iter()
        .filter_map(|(id, distance)| {
            rows.remove(id).map(|row| ScoredRow {
                row,
                score: 1.0 - distance,
                source: MatchSource::Semantic,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::types::{Category, ResultRow};

    fn scored(id: &str, score: f64, source: MatchSource) -> ScoredRow {
        ScoredRow {
            row: ResultRow {
                id: id.to_string(),
                category: Category::Research,
                created_at: "2026-10-19T08:00:00Z".into(),
                summary: id.to_string(),
            },
            score,
            source,
        }
    }

    #[test]
    fn overlap_is_boosted_capped_and_relabelled() {
        let fused = fuse_related(
            vec![scored("a", 1.0, MatchSource::TagMatch)],
            vec![scored("a", 0.9, MatchSource::Semantic)],
            10,
        );
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].score, 1.0);
        assert_eq!(fused[0].source, MatchSource::Both);
    }

    #[test]
    fn semantic_only_rows_keep_their_score_and_sort_below_tags() {
        let fused = fuse_related(
            vec![
                scored("t1", 1.0, MatchSource::TagMatch),
                scored("t2", 1.0, MatchSource::TagMatch),
            ],
            vec![
                scored("s1", 0.95, MatchSource::Semantic),
                scored("s2", 0.7, MatchSource::Semantic),
            ],
            10,
        );
        let order: Vec<(&str, MatchSource)> =
            fused.iter().map(|r| (r.row.id.as_str(), r.source)).collect();
        assert_eq!(
            order,
            vec![
                ("t1", MatchSource::TagMatch),
                ("t2", MatchSource::TagMatch),
                ("s1", MatchSource::Semantic),
                ("s2", MatchSource::Semantic),
            ]
        );
    }

    #[test]
    fn ties_keep_insertion_order_and_limit_applies_after_sort() {
        let fused = fuse_related(
            vec![scored("t1", 1.0, MatchSource::TagMatch)],
            vec![
                scored("s1", 0.8, MatchSource::Semantic),
                scored("s2", 0.8, MatchSource::Semantic),
                scored("s3", 0.99, MatchSource::Semantic),
            ],
            3,
        );
        let ids: Vec<&str> = fused.iter().map(|r| r.row.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "s3", "s1"]);
    }

    #[test]
    fn unavailable_semantic_returns_tag_matches_only() {
        let conn = crate::db::open_memory_database().unwrap();
        conn.execute_batch(
            "INSERT INTO blocks (id, created_at, updated_at, type, content) VALUES
                 ('b_1', '2026-10-18T08:00:00Z', '2026-10-18T08:00:00Z', 'research', 'one #db'),
                 ('b_2', '2026-10-19T08:00:00Z', '2026-10-19T08:00:00Z', 'idea', 'two #db'),
                 ('b_3', '2026-10-19T09:00:00Z', '2026-10-19T09:00:00Z', 'idea', 'three');
             INSERT INTO tags (name) VALUES ('db');
             INSERT INTO block_tags (block_id, tag_id) SELECT 'b_1', id FROM tags;
             INSERT INTO block_tags (block_id, tag_id) SELECT 'b_2', id FROM tags;",
        )
        .unwrap();

        let related =
            find_related(&conn, &SemanticCapability::unavailable(), "b_1", 10).unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].row.id, "b_2");
        assert_eq!(related[0].source, MatchSource::TagMatch);
        assert_eq!(related[0].score, TAG_MATCH_SCORE);
    }

    #[test]
    fn unknown_block_has_no_relations() {
        let conn = crate::db::open_memory_database().unwrap();
        let related =
            find_related(&conn, &SemanticCapability::unavailable(), "b_missing", 10).unwrap();
        assert!(related.is_empty());
    }
}
