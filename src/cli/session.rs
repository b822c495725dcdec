//! CLI `start` / `stop` commands for batch capture sessions.

use anyhow::Result;

use crate::config::CoeusConfig;
use crate::knowledge::session::{start_capture_mode, stop_capture_mode};

pub fn start(config: &CoeusConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let state_file = super::state_file(config);
    let mut state = state_file.load()?;

    let session_id = start_capture_mode(&conn, &mut state)?;
    state_file.save(&state)?;

    println!("Capture session started: {session_id}");
    Ok(())
}

pub fn stop(config: &CoeusConfig) -> Result<()> {
    let conn = super::open_db(config)?;
    let state_file = super::state_file(config);
    let mut state = state_file.load()?;

    let Some(session_id) = state.current_session_id.clone() else {
        println!("No capture session is active.");
        return Ok(());
    };

    let count = stop_capture_mode(&conn, &mut state)?;
    state_file.save(&state)?;

    println!("Capture session {session_id} stopped: {count} block(s)");
    Ok(())
}
