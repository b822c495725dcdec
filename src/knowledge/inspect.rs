//! Full view of a single block.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use super::link::links_from;
use super::types::{Block, Link};

#[derive(Debug, Serialize)]
pub struct BlockDetail {
    #[serde(flatten)]
    pub block: Block,
    pub summary: Option<String>,
    pub links: Vec<Link>,
}

/// The block with its joins, summary, and outgoing links, or `None` if the id is unknown.
pub fn get_block(conn: &Connection, id: &str) -> Result<Option<BlockDetail>> {
    let row = conn
        .query_row(
            "SELECT b.id, b.created_at, b.updated_at, b.type, b.content, b.session_id, s.one_line \
             FROM blocks b LEFT JOIN block_summaries s ON s.block_id = b.id \
             WHERE b.id = ?1",
            params![id],
            |row| {
                let category: String = row.get(3)?;
                Ok((
                    Block {
                        id: row.get(0)?,
                        created_at: row.get(1)?,
                        updated_at: row.get(2)?,
                        category: super::parse_category(3, &category)?,
                        content: row.get(4)?,
                        session_id: row.get(5)?,
                        tags: Vec::new(),
                        people: Vec::new(),
                        projects: Vec::new(),
                    },
                    row.get::<_, Option<String>>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((mut block, summary)) = row else {
        return Ok(None);
    };

    block.tags = joined_names(
        conn,
        "SELECT t.name FROM block_tags bt JOIN tags t ON t.id = bt.tag_id \
         WHERE bt.block_id = ?1 ORDER BY t.name",
        id,
    )?;
    block.people = joined_names(
        conn,
        "SELECT p.name FROM block_people bp JOIN people p ON p.id = bp.person_id \
         WHERE bp.block_id = ?1 ORDER BY p.name",
        id,
    )?;
    block.projects = joined_names(
        conn,
        "SELECT p.name FROM block_projects bp JOIN projects p ON p.id = bp.project_id \
         WHERE bp.block_id = ?1 ORDER BY p.name",
        id,
    )?;

    Ok(Some(BlockDetail {
        links: links_from(conn, id)?,
        block,
        summary,
    }))
}

fn joined_names(conn: &Connection, sql: &str, id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(sql)?;
    let names = stmt
        .query_map(params![id], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::SemanticCapability;
    use crate::knowledge::capture::{capture, CaptureRequest, CaptureSettings};
    use crate::knowledge::session::SessionState;
    use crate::knowledge::types::Category;

    #[test]
    fn unknown_id_is_none() {
        let conn = crate::db::open_memory_database().unwrap();
        assert!(get_block(&conn, "b_nope").unwrap().is_none());
    }

    #[test]
    fn detail_includes_joins_and_summary() {
        let mut conn = crate::db::open_memory_database().unwrap();
        let result = capture(
            &mut conn,
            &SemanticCapability::unavailable(),
            &mut SessionState::default(),
            CaptureRequest {
                content: "what if we sharded the #db by #tenant".into(),
                people: vec!["Ada".into()],
                projects: vec!["atlas".into()],
                ..Default::default()
            },
            &CaptureSettings::default(),
        )
        .unwrap();

        let detail = get_block(&conn, &result.id).unwrap().unwrap();
        assert_eq!(detail.block.category, Category::Idea);
        assert_eq!(detail.block.tags, vec!["db".to_string(), "tenant".to_string()]);
        assert_eq!(detail.block.people, vec!["Ada".to_string()]);
        assert_eq!(detail.block.projects, vec!["atlas".to_string()]);
        assert_eq!(
            detail.summary.as_deref(),
            Some("what if we sharded the #db by #tenant")
        );
        assert!(detail.links.is_empty());
    }
}
