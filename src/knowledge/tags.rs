//! Tag canonicalization through the alias table.

use anyhow::Result;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;

/// Something that can map a lower-cased tag to its canonical name.
pub trait AliasLookup {
    fn lookup(&self, lowered: &str) -> Option<&str>;
}

impl AliasLookup for HashMap<String, String> {
    fn lookup(&self, lowered: &str) -> Option<&str> {
        self.get(lowered).map(String::as_str)
    }
}

/// Canonical form of `tag`: the alias target if one exists, else the lower-cased input.
pub fn resolve(aliases: &impl AliasLookup, tag: &str) -> String {
    let lowered = tag.to_lowercase();
    match aliases.lookup(&lowered) {
        Some(canonical) => canonical.to_string(),
        None => lowered,
    }
}

/// Snapshot of `tag_aliases`, loaded once per capture.
#[derive(Debug, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare("SELECT alias, canonical FROM tag_aliases")?;
        let aliases = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()?;
        Ok(Self { aliases })
    }

    pub fn resolve(&self, tag: &str) -> String {
        resolve(&self.aliases, tag)
    }
}

impl AliasLookup for AliasTable {
    fn lookup(&self, lowered: &str) -> Option<&str> {
        self.aliases.lookup(lowered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagAlias {
    pub alias: String,
    pub canonical: String,
}

/// Create or replace an alias. Both sides are stored lower-cased.
pub fn set_alias(conn: &Connection, alias: &str, canonical: &str) -> Result<TagAlias> {
    let alias = alias.trim().trim_start_matches('#').to_lowercase();
    let canonical = canonical.trim().trim_start_matches('#').to_lowercase();
    anyhow::ensure!(!alias.is_empty(), "alias must not be empty");
    anyhow::ensure!(!canonical.is_empty(), "canonical tag must not be empty");

    conn.execute(
        "INSERT INTO tag_aliases (alias, canonical) VALUES (?1, ?2) \
         ON CONFLICT(alias) DO UPDATE SET canonical = excluded.canonical",
        params![alias, canonical],
    )?;
    tracing::info!(alias = %alias, canonical = %canonical, "tag alias set");
    Ok(TagAlias { alias, canonical })
}

pub fn list_aliases(conn: &Connection) -> Result<Vec<TagAlias>> {
    let mut stmt = conn.prepare("SELECT alias, canonical FROM tag_aliases ORDER BY alias")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(TagAlias {
                alias: row.get(0)?,
                canonical: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
