mod helpers;

use coeus::embedding::SemanticCapability;
use coeus::knowledge::capture::{capture, CaptureRequest, CaptureSettings};
use coeus::knowledge::session::{start_capture_mode, stop_capture_mode, SessionState, StateFile};
use helpers::test_db;
use rusqlite::params;
use tempfile::TempDir;

#[test]
fn session_collects_blocks_until_stopped() {
    let mut conn = test_db();
    let mut state = SessionState::default();
    let semantic = SemanticCapability::unavailable();
    let settings = CaptureSettings::default();

    let session_id = start_capture_mode(&conn, &mut state).unwrap();
    for text in ["standup notes", "retro notes"] {
        capture(&mut conn, &semantic, &mut state, CaptureRequest::new(text), &settings).unwrap();
    }
    assert_eq!(stop_capture_mode(&conn, &mut state).unwrap(), 2);

    let outside = capture(
        &mut conn,
        &semantic,
        &mut state,
        CaptureRequest::new("after the session"),
        &settings,
    )
    .unwrap();
    let outside_session: Option<String> = conn
        .query_row(
            "SELECT session_id FROM blocks WHERE id = ?1",
            params![outside.id],
            |row| row.get(0),
        )
        .unwrap();
    assert!(outside_session.is_none());

    let recorded: i64 = conn
        .query_row(
            "SELECT block_count FROM capture_sessions WHERE id = ?1",
            params![session_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(recorded, 2);
}

#[test]
fn state_file_carries_the_session_across_processes() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("coeus.db");
    let state_file = StateFile::new(dir.path().join("state.json"));

    let session_id = {
        let conn = coeus::db::open_database(&db_path).unwrap();
        let mut state = state_file.load().unwrap();
        let id = start_capture_mode(&conn, &mut state).unwrap();
        state_file.save(&state).unwrap();
        id
    };

    let mut conn = coeus::db::open_database(&db_path).unwrap();
    let mut state = state_file.load().unwrap();
    assert!(state.capture_mode);
    assert_eq!(state.current_session_id.as_deref(), Some(session_id.as_str()));

    capture(
        &mut conn,
        &SemanticCapability::unavailable(),
        &mut state,
        CaptureRequest::new("captured in a later process"),
        &CaptureSettings::default(),
    )
    .unwrap();
    assert_eq!(stop_capture_mode(&conn, &mut state).unwrap(), 1);
    state_file.save(&state).unwrap();

    let reloaded = state_file.load().unwrap();
    assert!(!reloaded.capture_mode);
    assert!(reloaded.current_session_id.is_none());
    assert!(reloaded.last_capture_block_id.is_some());
}

#[test]
fn unknown_session_in_state_is_dropped_on_capture() {
    let mut conn = test_db();
    let mut state = SessionState {
        capture_mode: true,
        current_session_id: Some("cs_1700000000_abcd1234".into()),
        last_capture_block_id: None,
    };

    let result = capture(
        &mut conn,
        &SemanticCapability::unavailable(),
        &mut state,
        CaptureRequest::new("captured against a different database"),
        &CaptureSettings::default(),
    )
    .unwrap();

    let session_id: Option<String> = conn
        .query_row(
            "SELECT session_id FROM blocks WHERE id = ?1",
            params![result.id],
            |row| row.get(0),
        )
        .unwrap();
    assert!(session_id.is_none());
    assert!(!state.capture_mode);
    assert!(state.current_session_id.is_none());
    assert_eq!(state.last_capture_block_id.as_deref(), Some(result.id.as_str()));
}
