//! CLI `doctor` command: database diagnostics and a health report.

use anyhow::{Context, Result};

use crate::config::CoeusConfig;
use crate::db;
use crate::embedding::local::model_paths;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &CoeusConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `coeus capture` or `coeus serve` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path)
        .map(|m| m.len())
        .unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;

    let report = db::check_database_health(&conn)
        .context("failed to run health check")?;

    println!("Coeus Health Report");
    println!("===================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!("sqlite-vec:        v{}", report.sqlite_vec_version);
    println!();
    println!("Embedding model:");
    println!("  Stored:          {}", report.embedding_model.as_deref().unwrap_or("(not set)"));
    println!("  Configured:      {}", config.embedding.model);
    if let Some(ref stored) = report.embedding_model {
        if stored != &config.embedding.model {
            println!("  WARNING: model mismatch; existing vectors came from {stored}.");
        } else {
            println!("  Status:          OK (match)");
        }
    }
    let (model_file, tokenizer_file) = model_paths(&config.embedding);
    let installed = model_file.exists() && tokenizer_file.exists();
    println!(
        "  Files:           {}",
        if installed { "installed" } else { "missing (run `coeus model download`)" }
    );
    if !config.embedding.enabled {
        println!("  Semantic search: disabled in config");
    }
    println!();
    println!("Row counts:");
    println!("  Blocks:          {}", report.block_count);
    println!("  Links:           {}", report.link_count);
    println!("  Embeddings:      {}", report.embedding_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }

    if !report.integrity_ok {
        println!();
        println!("Recovery: restore {} from a backup copy.", db_path.display());
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
