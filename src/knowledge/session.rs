//! Batch capture sessions and the persisted session state file.
//!
//! While a session is open every captured block records its id. Stopping the
//! session stamps `ended_at` and the number of blocks captured in it.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Mutable state carried between captures and across process restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionState {
    pub capture_mode: bool,
    pub current_session_id: Option<String>,
    pub last_capture_block_id: Option<String>,
}

/// JSON file backing a [`SessionState`].
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the state, or defaults if the file does not exist yet.
    pub fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse state file: {}", self.path.display()))
    }

    /// Write pretty JSON to a sibling temp file, then rename over the target.
    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create state directory: {}", parent.display())
            })?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(state)?)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

/// Open a batch session and make it current. Returns the new session id.
///
/// Starting while another session is open leaves the old one without an
/// `ended_at`; it simply stops collecting blocks.
pub fn start_capture_mode(conn: &Connection, state: &mut SessionState) -> Result<String> {
    let session_id = super::generate_id("cs");
    conn.execute(
        "INSERT INTO capture_sessions (id, started_at, mode) VALUES (?1, ?2, 'batch')",
        params![session_id, super::now_timestamp()],
    )?;

    if let Some(previous) = state.current_session_id.as_deref() {
        tracing::warn!(previous = %previous, "capture session replaced before it was stopped");
    }
    state.capture_mode = true;
    state.current_session_id = Some(session_id.clone());

    tracing::info!(session = %session_id, "capture session started");
    Ok(session_id)
}

/// Close the current session. Returns how many blocks it collected, or 0 when
/// no session was open.
pub fn stop_capture_mode(conn: &Connection, state: &mut SessionState) -> Result<u64> {
    let Some(session_id) = state.current_session_id.clone() else {
        state.capture_mode = false;
        return Ok(0);
    };

    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM blocks WHERE session_id = ?1",
        params![session_id],
        |row| row.get(0),
    )?;
    conn.execute(
        "UPDATE capture_sessions SET ended_at = ?1, block_count = ?2 WHERE id = ?3",
        params![super::now_timestamp(), count, session_id],
    )?;

    state.capture_mode = false;
    state.current_session_id = None;

    tracing::info!(session = %session_id, blocks = count, "capture session stopped");
    Ok(count as u64)
}
