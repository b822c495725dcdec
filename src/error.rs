//! Typed errors for values parsed from user input.
//!
//! Storage and pipeline code propagates `anyhow::Error`; these variants exist so
//! callers (CLI, MCP tools) can tell a bad argument apart from a failed write.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown block type: {0} (expected work_log, journal, idea, or research)")]
    UnknownCategory(String),

    #[error("unknown brief period: {0} (expected today, yesterday, or week)")]
    UnknownPeriod(String),
}
