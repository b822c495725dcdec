//! Period briefs: what was captured today, yesterday, or this week.

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::BTreeMap;

use super::types::Category;
use super::SUMMARY_CHARS;
use crate::error::ParseError;

/// Most blocks listed in one brief.
pub const BRIEF_BLOCK_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BriefPeriod {
    Today,
    Yesterday,
    Week,
}

impl BriefPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Week => "week",
        }
    }
}

impl std::fmt::Display for BriefPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BriefPeriod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            _ => Err(ParseError::UnknownPeriod(s.to_string())),
        }
    }
}

/// Half-open `[start, end)` window covered by `period`, evaluated at `now`.
///
/// Weeks start on Monday. All boundaries are UTC midnights except the open end
/// of `today` and `week`, which is one second past `now`.
pub fn period_bounds(period: BriefPeriod, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let until_now = now + Duration::seconds(1);
    match period {
        BriefPeriod::Today => (midnight, until_now),
        BriefPeriod::Yesterday => (midnight - Duration::days(1), midnight),
        BriefPeriod::Week => {
            let since_monday = i64::from(now.weekday().num_days_from_monday());
            (midnight - Duration::days(since_monday), until_now)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub summary: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct Brief {
    pub period: BriefPeriod,
    /// Block counts per category; categories with no blocks are absent.
    pub counts: BTreeMap<Category, u64>,
    /// Up to [`BRIEF_BLOCK_LIMIT`] blocks grouped by category, oldest first.
    pub blocks: BTreeMap<Category, Vec<BriefEntry>>,
    pub total: u64,
}

pub fn brief(conn: &Connection, period: BriefPeriod, now: DateTime<Utc>) -> Result<Brief> {
    let (start, end) = period_bounds(period, now);
    let start = super::format_timestamp(start);
    let end = super::format_timestamp(end);

    let mut counts = BTreeMap::new();
    let mut stmt = conn.prepare(
        "SELECT type, COUNT(*) FROM blocks \
         WHERE created_at >= ?1 AND created_at < ?2 GROUP BY type",
    )?;
    let rows = stmt.query_map(params![start, end], |row| {
        let category: String = row.get(0)?;
        Ok((super::parse_category(0, &category)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (category, count) = row?;
        counts.insert(category, count as u64);
    }

    let sql = format!(
        "SELECT b.id, b.type, COALESCE(s.one_line, SUBSTR(b.content, 1, {SUMMARY_CHARS})), b.created_at \
         FROM blocks b LEFT JOIN block_summaries s ON s.block_id = b.id \
         WHERE b.created_at >= ?1 AND b.created_at < ?2 \
         ORDER BY b.type, b.created_at, b.id LIMIT ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![start, end, BRIEF_BLOCK_LIMIT as i64], |row| {
            let category: String = row.get(1)?;
            Ok(BriefEntry {
                id: row.get(0)?,
                category: super::parse_category(1, &category)?,
                summary: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut blocks: BTreeMap<Category, Vec<BriefEntry>> = BTreeMap::new();
    for entry in entries {
        blocks.entry(entry.category).or_default().push(entry);
    }

    let total: u64 = counts.values().sum();
    tracing::debug!(period = %period, start = %start, end = %end, total, "brief built");

    Ok(Brief {
        period,
        counts,
        blocks,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn unknown_period_is_a_typed_error() {
        assert_eq!(
            "month".parse::<BriefPeriod>(),
            Err(ParseError::UnknownPeriod("month".into()))
        );
        assert_eq!("week".parse::<BriefPeriod>(), Ok(BriefPeriod::Week));
    }

    #[test]
    fn today_starts_at_utc_midnight() {
        let now = at(2026, 10, 19, 15, 30);
        let (start, end) = period_bounds(BriefPeriod::Today, now);
        assert_eq!(start, at(2026, 10, 19, 0, 0));
        assert!(end > now);
    }

    #[test]
    fn yesterday_crosses_month_boundary() {
        let now = at(2026, 11, 1, 9, 0);
        let (start, end) = period_bounds(BriefPeriod::Yesterday, now);
        assert_eq!(start, at(2026, 10, 31, 0, 0));
        assert_eq!(end, at(2026, 11, 1, 0, 0));
    }

    #[test]
    fn week_starts_on_monday() {
        // 2026-10-22 is a Thursday
        let (start, _) = period_bounds(BriefPeriod::Week, at(2026, 10, 22, 12, 0));
        assert_eq!(start, at(2026, 10, 19, 0, 0));

        let (start, _) = period_bounds(BriefPeriod::Week, at(2026, 10, 19, 0, 0));
        assert_eq!(start, at(2026, 10, 19, 0, 0));

        // Sunday belongs to the week that began six days earlier
        let (start, _) = period_bounds(BriefPeriod::Week, at(2026, 11, 1, 8, 0));
        assert_eq!(start, at(2026, 10, 26, 0, 0));
    }
}
