mod helpers;

use coeus::embedding::SemanticCapability;
use coeus::knowledge::search::search;
use helpers::{
    blended_embedding, insert_block, insert_embedding, semantic_with, test_db, test_embedding,
    FailingEncoder, KeywordEncoder,
};

fn ids(rows: &[coeus::knowledge::types::ResultRow]) -> Vec<&str> {
    rows.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn three_exact_hits_never_touch_the_encoder() {
    let conn = test_db();
    insert_block(&conn, "b_1", "2026-10-19T08:00:00Z", "research", "rust traits", &[]);
    insert_block(&conn, "b_2", "2026-10-19T08:01:00Z", "research", "rust macros", &[]);
    insert_block(&conn, "b_3", "2026-10-19T08:02:00Z", "idea", "rust on embedded", &[]);
    insert_block(&conn, "b_4", "2026-10-19T08:03:00Z", "journal", "slept well", &[]);

    let failing = FailingEncoder::new();
    let with_failing = search(&conn, &semantic_with(failing.clone()), "rust", 10).unwrap();
    let without = search(&conn, &SemanticCapability::unavailable(), "rust", 10).unwrap();

    assert_eq!(failing.calls(), 0);
    assert_eq!(with_failing.len(), 3);
    assert_eq!(with_failing, without);
}

#[test]
fn sparse_exact_hits_are_followed_by_semantic_hits() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "the borrow checker", &[]);
    insert_block(&conn, "b_b", "2026-10-19T08:01:00Z", "research", "ownership notes", &[]);
    insert_block(&conn, "b_c", "2026-10-19T08:02:00Z", "idea", "lifetimes explained", &[]);
    insert_block(&conn, "b_d", "2026-10-19T08:03:00Z", "research", "gardening tips", &[]);
    insert_embedding(&conn, "b_a", &test_embedding(0));
    insert_embedding(&conn, "b_b", &blended_embedding(0, 1, 0.8));
    insert_embedding(&conn, "b_c", &test_embedding(0));
    insert_embedding(&conn, "b_d", &test_embedding(5));

    let encoder = KeywordEncoder::new(&[("borrow", 0)]);
    let rows = search(&conn, &semantic_with(encoder.clone()), "borrow", 10).unwrap();

    assert_eq!(encoder.calls(), 1);
    assert_eq!(ids(&rows), vec!["b_a", "b_c", "b_b"]);
}

#[test]
fn fused_results_respect_the_limit() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "the borrow checker", &[]);
    insert_block(&conn, "b_b", "2026-10-19T08:01:00Z", "research", "ownership notes", &[]);
    insert_block(&conn, "b_c", "2026-10-19T08:02:00Z", "idea", "lifetimes explained", &[]);
    for id in ["b_a", "b_b", "b_c"] {
        insert_embedding(&conn, id, &test_embedding(0));
    }

    let encoder = KeywordEncoder::new(&[("borrow", 0)]);
    let rows = search(&conn, &semantic_with(encoder), "borrow", 2).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, "b_a");
    assert_ne!(rows[0].id, rows[1].id);
}

#[test]
fn dissimilar_blocks_are_not_semantic_hits() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "vector clocks", &[]);
    insert_block(&conn, "b_b", "2026-10-19T08:01:00Z", "research", "lamport timestamps", &[]);
    insert_embedding(&conn, "b_a", &blended_embedding(7, 8, 0.55));
    insert_embedding(&conn, "b_b", &test_embedding(9));

    let encoder = KeywordEncoder::new(&[("ordering", 7)]);
    let rows = search(&conn, &semantic_with(encoder), "event ordering", 10).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn encoder_failure_falls_back_to_exact_results() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "raft consensus", &[]);
    insert_embedding(&conn, "b_a", &test_embedding(0));

    let failing = FailingEncoder::new();
    let rows = search(&conn, &semantic_with(failing.clone()), "raft", 10).unwrap();

    assert_eq!(failing.calls(), 1);
    assert_eq!(ids(&rows), vec!["b_a"]);
}

#[test]
fn unavailable_semantic_with_no_exact_hits_is_empty() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "raft consensus", &[]);

    let rows = search(&conn, &SemanticCapability::unavailable(), "paxos", 10).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn query_syntax_characters_are_treated_as_text() {
    let conn = test_db();
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "research", "raft OR paxos", &[]);

    let rows = search(&conn, &SemanticCapability::unavailable(), "paxos (", 10).unwrap();
    assert!(rows.is_empty() || rows[0].id == "b_a");

    let rows = search(&conn, &SemanticCapability::unavailable(), "\"raft\"", 10).unwrap();
    assert_eq!(ids(&rows), vec!["b_a"]);
}

#[test]
fn summary_falls_back_to_content_prefix() {
    let conn = test_db();
    let long = format!("kafka {}", "partition ".repeat(10));
    insert_block(&conn, "b_a", "2026-10-19T08:00:00Z", "work_log", &long, &[]);

    let rows = search(&conn, &SemanticCapability::unavailable(), "kafka", 10).unwrap();
    assert_eq!(rows[0].summary.chars().count(), 60);
    assert!(long.starts_with(&rows[0].summary));
}
