#![allow(dead_code)]

use coeus::embedding::{embedding_to_bytes, EmbeddingProvider, SemanticCapability, EMBEDDING_DIM};
use rusqlite::{params, Connection};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    coeus::db::open_memory_database().unwrap()
}

/// Deterministic 384-dim unit vector with a spike at position `seed`.
/// Different seeds are orthogonal.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = 1.0;
    v
}

/// Unit vector with cosine similarity `similarity` to `test_embedding(seed)`,
/// leaning towards `test_embedding(other)` for the remainder.
pub fn blended_embedding(seed: usize, other: usize, similarity: f32) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[seed % EMBEDDING_DIM] = similarity;
    v[other % EMBEDDING_DIM] = (1.0 - similarity * similarity).sqrt();
    v
}

/// Encoder that maps text to a spike chosen by the first keyword it contains,
/// and counts how often it is called.
pub struct KeywordEncoder {
    rules: Vec<(&'static str, usize)>,
    fallback: usize,
    calls: AtomicUsize,
}

impl KeywordEncoder {
    pub fn new(rules: &[(&'static str, usize)]) -> Arc<Self> {
        Arc::new(Self {
            rules: rules.to_vec(),
            fallback: EMBEDDING_DIM - 1,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for KeywordEncoder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let lowered = text.to_lowercase();
        let seed = self
            .rules
            .iter()
            .find(|(word, _)| lowered.contains(word))
            .map(|(_, seed)| *seed)
            .unwrap_or(self.fallback);
        Ok(test_embedding(seed))
    }
}

/// Encoder that always fails, counting attempts.
#[derive(Default)]
pub struct FailingEncoder {
    calls: AtomicUsize,
}

impl FailingEncoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingProvider for FailingEncoder {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("encoder offline")
    }
}

/// Model name the test encoders are registered under.
pub const TEST_MODEL: &str = "test-encoder";

pub fn semantic_with(encoder: Arc<dyn EmbeddingProvider>) -> SemanticCapability {
    SemanticCapability::available(encoder, TEST_MODEL)
}

/// Insert a block with explicit timestamp, FTS row, and tags, bypassing capture.
pub fn insert_block(
    conn: &Connection,
    id: &str,
    created_at: &str,
    category: &str,
    content: &str,
    tags: &[&str],
) {
    conn.execute(
        "INSERT INTO blocks (id, created_at, updated_at, type, content) VALUES (?1, ?2, ?2, ?3, ?4)",
        params![id, created_at, category, content],
    )
    .unwrap();
    let rowid = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO blocks_fts (rowid, content, id) VALUES (?1, ?2, ?3)",
        params![rowid, content, id],
    )
    .unwrap();
    for tag in tags {
        conn.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1)", params![tag])
            .unwrap();
        conn.execute(
            "INSERT INTO block_tags (block_id, tag_id) SELECT ?1, id FROM tags WHERE name = ?2",
            params![id, tag],
        )
        .unwrap();
    }
}

pub fn insert_embedding(conn: &Connection, id: &str, embedding: &[f32]) {
    conn.execute(
        "INSERT INTO block_embeddings (block_id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(embedding)],
    )
    .unwrap();
}

pub fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}
