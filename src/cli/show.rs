//! CLI `show` command: display one block in full.

use anyhow::{bail, Result};

use crate::config::CoeusConfig;

pub fn show(config: &CoeusConfig, id: &str) -> Result<()> {
    let conn = super::open_db(config)?;
    let Some(detail) = crate::knowledge::inspect::get_block(&conn, id)? else {
        bail!("block not found: {id}");
    };

    let b = &detail.block;
    println!("Block: {}", b.id);
    println!("{}", "=".repeat(50));
    println!("  Type:      {}", b.category);
    println!("  Created:   {}", b.created_at);
    println!("  Updated:   {}", b.updated_at);
    if let Some(ref session) = b.session_id {
        println!("  Session:   {session}");
    }
    if !b.tags.is_empty() {
        println!("  Tags:      {}", b.tags.join(", "));
    }
    if !b.people.is_empty() {
        println!("  People:    {}", b.people.join(", "));
    }
    if !b.projects.is_empty() {
        println!("  Projects:  {}", b.projects.join(", "));
    }
    if let Some(ref summary) = detail.summary {
        println!("  Summary:   {summary}");
    }
    println!();
    println!("Content:");
    println!("  {}", b.content);

    if !detail.links.is_empty() {
        println!();
        println!("Links:");
        for link in &detail.links {
            println!(
                "  --[{}]--> {} (confidence: {:.2})",
                link.kind.as_str(),
                link.target_id,
                link.confidence
            );
        }
    }

    Ok(())
}
