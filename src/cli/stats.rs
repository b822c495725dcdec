use anyhow::Result;

use crate::config::CoeusConfig;
use crate::knowledge::types::Category;

/// Display knowledge-base statistics in the terminal.
pub fn stats(config: &CoeusConfig) -> Result<()> {
    let (conn, semantic) = super::open_with_semantic(config)?;
    let state = super::state_file(config).load()?;
    let response = crate::knowledge::stats::stats(&conn, &semantic, &state)?;

    println!("Knowledge Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total blocks:        {}", response.total_blocks);
    println!();

    println!("By Type:");
    for category in Category::ALL {
        let count = response.by_type.get(&category).copied().unwrap_or(0);
        println!("  {:<12} {}", category.as_str(), count);
    }
    println!();

    println!("Tags:                  {}", response.tags);
    println!("Links:                 {}", response.links);
    println!("Sessions:              {}", response.sessions);
    println!("Embeddings:            {}", response.embeddings);
    println!(
        "Semantic search:       {}",
        if response.has_semantic { "available" } else { "unavailable" }
    );
    println!(
        "Capture mode:          {}",
        if response.capture_mode { "on" } else { "off" }
    );

    Ok(())
}
