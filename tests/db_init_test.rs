use coeus::db;
use tempfile::TempDir;

#[test]
fn open_creates_new_db_at_nonexistent_path() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("subdir").join("new.db");
    assert!(!db_path.exists());

    let conn = db::open_database(&db_path).unwrap();
    assert!(db_path.exists());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM blocks", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn all_tables_exist_after_open() {
    let conn = db::open_memory_database().unwrap();
    let tables: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type IN ('table') ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    for expected in [
        "blocks",
        "blocks_fts",
        "block_embeddings",
        "tags",
        "block_tags",
        "tag_aliases",
        "people",
        "block_people",
        "projects",
        "block_projects",
        "links",
        "block_summaries",
        "capture_sessions",
        "capture_days",
        "schema_meta",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
    }
}

#[test]
fn reopening_keeps_data_and_schema_version() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("coeus.db");

    {
        let conn = db::open_database(&db_path).unwrap();
        conn.execute(
            "INSERT INTO blocks (id, created_at, updated_at, type, content) \
             VALUES ('b_1', '2026-10-19T08:00:00Z', '2026-10-19T08:00:00Z', 'idea', 'keep me')",
            [],
        )
        .unwrap();
    }

    let conn = db::open_database(&db_path).unwrap();
    let content: String = conn
        .query_row("SELECT content FROM blocks WHERE id = 'b_1'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(content, "keep me");
    assert_eq!(
        db::migrations::get_schema_version(&conn).unwrap(),
        db::migrations::CURRENT_SCHEMA_VERSION
    );
}

#[test]
fn health_check_passes_on_valid_db() {
    let conn = db::open_memory_database().unwrap();

    let report = db::check_database_health(&conn).unwrap();
    assert!(report.integrity_ok);
    assert_eq!(report.schema_version, db::migrations::CURRENT_SCHEMA_VERSION);
    assert!(!report.sqlite_vec_version.is_empty());
    assert!(report.embedding_model.is_none());
    assert_eq!(report.block_count, 0);
    assert_eq!(report.link_count, 0);
    assert_eq!(report.embedding_count, 0);
}

#[test]
fn busy_timeout_and_wal_are_set() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open_database(tmp.path().join("test.db")).unwrap();

    let timeout: i64 = conn
        .pragma_query_value(None, "busy_timeout", |row| row.get(0))
        .unwrap();
    assert_eq!(timeout, 5000);

    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn foreign_keys_reject_links_to_missing_blocks() {
    let conn = db::open_memory_database().unwrap();
    let result = conn.execute(
        "INSERT INTO links (source_id, target_id, link_type, confidence, created_at) \
         VALUES ('b_x', 'b_y', 'auto', 0.2, '2026-10-19T08:00:00Z')",
        [],
    );
    assert!(result.is_err());
}
