use anyhow::Result;

use crate::config::CoeusConfig;
use crate::knowledge::brief::BriefPeriod;
use crate::knowledge::types::Category;

/// Print a brief for `period`, one section per category.
pub fn brief(config: &CoeusConfig, period: BriefPeriod) -> Result<()> {
    let conn = super::open_db(config)?;
    let brief = crate::knowledge::brief::brief(&conn, period, chrono::Utc::now())?;

    println!("Brief for {}: {} block(s)", brief.period, brief.total);
    for category in Category::ALL {
        let Some(entries) = brief.blocks.get(&category) else {
            continue;
        };
        let count = brief.counts.get(&category).copied().unwrap_or(0);
        println!();
        println!("{category} ({count})");
        for entry in entries {
            println!("  {}  {}  {}", entry.created_at, entry.id, entry.summary);
        }
    }

    Ok(())
}
