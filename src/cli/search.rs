//! CLI `search` and `related` commands.

use anyhow::Result;

use crate::config::CoeusConfig;

/// Run a hybrid search from the terminal.
pub fn search(config: &CoeusConfig, query: &str, limit: usize) -> Result<()> {
    let (conn, semantic) = super::open_with_semantic(config)?;
    let rows = crate::knowledge::search::search(&conn, &semantic, query, limit)?;

    if rows.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s)\n", rows.len());
    for (i, row) in rows.iter().enumerate() {
        println!("  {}. [{}] {}  {}", i + 1, row.category, row.id, row.created_at);
        println!("     {}", row.summary);
        println!();
    }

    Ok(())
}

/// List blocks related to `id` with their score and how they were found.
pub fn related(config: &CoeusConfig, id: &str, limit: usize) -> Result<()> {
    let (conn, semantic) = super::open_with_semantic(config)?;
    let rows = crate::knowledge::related::find_related(&conn, &semantic, id, limit)?;

    if rows.is_empty() {
        println!("No related blocks for {id}.");
        return Ok(());
    }

    println!("Related to {id}:\n");
    for (i, scored) in rows.iter().enumerate() {
        println!(
            "  {}. [{}] {} (score: {:.2}, via {})",
            i + 1,
            scored.row.category,
            scored.row.id,
            scored.score,
            scored.source,
        );
        println!("     {}", scored.row.summary);
    }

    Ok(())
}
