//! Core record types.
//!
//! [`Category`] is the closed set of block types, [`Block`] a captured note,
//! [`Link`] a directed edge between blocks, and [`ResultRow`] / [`ScoredRow`] the
//! rows returned by search and related-block discovery.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// What kind of note a block is. Inferred from the text unless given explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Things done: shipped, fixed, deployed, meetings.
    WorkLog,
    /// Reflections and feelings.
    Journal,
    /// Speculation and things to try.
    Idea,
    /// Everything else.
    Research,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::WorkLog,
        Category::Journal,
        Category::Idea,
        Category::Research,
    ];

    /// SQL-compatible string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkLog => "work_log",
            Self::Journal => "journal",
            Self::Idea => "idea",
            Self::Research => "research",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work_log" => Ok(Self::WorkLog),
            "journal" => Ok(Self::Journal),
            "idea" => Ok(Self::Idea),
            "research" => Ok(Self::Research),
            _ => Err(ParseError::UnknownCategory(s.to_string())),
        }
    }
}

/// Kind of a [`Link`]. Only system-generated links exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Auto,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
        }
    }
}

/// A captured note, matching the `blocks` table plus its tag/people/project joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// `b_<unix seconds>_<random hex>`.
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub content: String,
    /// Capture session the block was recorded in, if batch capture was on.
    pub session_id: Option<String>,
    pub tags: Vec<String>,
    pub people: Vec<String>,
    pub projects: Vec<String>,
}

/// A directed relationship `source_id → target_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub source_id: String,
    pub target_id: String,
    pub kind: LinkKind,
    /// In `[0.0, 1.0]`.
    pub confidence: f64,
    pub created_at: String,
}

/// One row of a search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub id: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub created_at: String,
    /// Stored one-line summary, or the first 60 characters of the content.
    pub summary: String,
}

/// Which neighbour set produced a related block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    TagMatch,
    Semantic,
    Both,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TagMatch => "tag_match",
            Self::Semantic => "semantic",
            Self::Both => "both",
        }
    }
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A related block with its fused score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    #[serde(flatten)]
    pub row: ResultRow,
    pub score: f64,
    pub source: MatchSource,
}
