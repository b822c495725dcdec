//! CLI `alias` commands: manage tag aliases.

use anyhow::Result;

use crate::config::CoeusConfig;
use crate::knowledge::tags;

pub fn set(config: &CoeusConfig, alias: &str, canonical: &str) -> Result<()> {
    let conn = super::open_db(config)?;
    let stored = tags::set_alias(&conn, alias, canonical)?;
    println!("#{} -> #{}", stored.alias, stored.canonical);
    Ok(())
}

pub fn list(config: &CoeusConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let aliases = tags::list_aliases(&conn)?;

    if aliases.is_empty() {
        println!("No tag aliases defined.");
        return Ok(());
    }

    for entry in aliases {
        println!("  #{:<20} -> #{}", entry.alias, entry.canonical);
    }
    Ok(())
}
