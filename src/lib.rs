//! Personal knowledge capture with heuristic classification, auto-linking, and
//! hybrid keyword/semantic retrieval.
//!
//! Notes ("blocks") are captured as short freeform text. Each capture infers a
//! category, extracts `#hashtags`, canonicalizes them through an alias table, and
//! links the new block to earlier blocks that share its tags.
//!
//! | Category | Picked when the text mentions... |
//! |----------|----------------------------------|
//! | **work_log** | shipped, fixed, deployed, merged, meetings |
//! | **journal** | feelings and realizations |
//! | **idea** | what if, maybe, could |
//! | **research** | anything else |
//!
//! # Architecture
//!
//! - **Storage**: SQLite with FTS5 for exact-match search and
//!   [sqlite-vec](https://github.com/asg017/sqlite-vec) for cosine distance
//! - **Embeddings**: Local ONNX Runtime with all-MiniLM-L6-v2 (384 dimensions), optional
//! - **Search**: keyword first, semantic fallback when fewer than three keyword hits
//! - **Related blocks**: shared tags fused with embedding neighbours, boosted on overlap
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from TOML files and environment variables
//! - [`db`]: SQLite initialization, schema, migrations, and health checks
//! - [`embedding`]: Text-to-vector encoders and the semantic capability flag
//! - [`knowledge`]: Capture, classification, linking, search, related, briefs, sessions

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod knowledge;
