use anyhow::Result;

use crate::config::CoeusConfig;
use crate::knowledge::capture::{capture as capture_block, CaptureRequest, CaptureSettings};

/// Capture a block from the terminal and print what was stored.
pub fn capture(config: &CoeusConfig, request: CaptureRequest) -> Result<()> {
    let (mut conn, semantic) = super::open_with_semantic(config)?;
    let state_file = super::state_file(config);
    let mut state = state_file.load()?;

    let result = capture_block(
        &mut conn,
        &semantic,
        &mut state,
        request,
        &CaptureSettings::from_config(config),
    )?;
    state_file.save(&state)?;

    println!("Captured {} [{}]", result.id, result.category);
    if !result.tags.is_empty() {
        println!("  Tags:   {}", result.tags.join(", "));
    }
    if result.links_created > 0 {
        println!("  Linked: {} block(s)", result.links_created);
    }
    if let Some(session) = state.current_session_id.as_deref() {
        println!("  Session: {session}");
    }

    Ok(())
}
