pub mod alias;
pub mod brief;
pub mod capture;
pub mod doctor;
pub mod search;
pub mod session;
pub mod show;
pub mod stats;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::config::CoeusConfig;
use crate::embedding::local::{model_paths, MODEL_FILE, TOKENIZER_FILE};
use crate::embedding::SemanticCapability;
use crate::knowledge::session::StateFile;

const MODEL_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx";
const TOKENIZER_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json";

/// Open the configured database, creating it on first use.
pub(crate) fn open_db(config: &CoeusConfig) -> Result<Connection> {
    let db_path = config.resolved_db_path();
    crate::db::open_database(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))
}

/// Open the database and resolve semantic search against it.
pub(crate) fn open_with_semantic(config: &CoeusConfig) -> Result<(Connection, SemanticCapability)> {
    let conn = open_db(config)?;
    let semantic = SemanticCapability::resolve(&conn, &config.embedding);
    Ok((conn, semantic))
}

pub(crate) fn state_file(config: &CoeusConfig) -> StateFile {
    StateFile::new(config.resolved_state_path())
}

/// Download the ONNX embedding model and tokenizer to the cache directory.
pub async fn model_download(config: &crate::config::EmbeddingConfig) -> Result<()> {
    let (model_path, tokenizer_path) = model_paths(config);
    if let Some(cache_dir) = model_path.parent() {
        std::fs::create_dir_all(cache_dir)
            .with_context(|| format!("failed to create cache dir: {}", cache_dir.display()))?;
    }

    if model_path.exists() {
        println!("Model already exists at {}", model_path.display());
    } else {
        println!("Downloading {MODEL_FILE} (~90MB)...");
        download_file(MODEL_URL, &model_path).await?;
        println!("Model saved to {}", model_path.display());
    }

    if tokenizer_path.exists() {
        println!("Tokenizer already exists at {}", tokenizer_path.display());
    } else {
        println!("Downloading {TOKENIZER_FILE}...");
        download_file(TOKENIZER_URL, &tokenizer_path).await?;
        println!("Tokenizer saved to {}", tokenizer_path.display());
    }

    println!("Model download complete. Semantic search is available on next start.");
    Ok(())
}

/// Stream a URL to disk with a progress bar. Writes to a temp file, then renames.
async fn download_file(url: &str, dest: &Path) -> Result<()> {
    let mut response = reqwest::get(url)
        .await
        .with_context(|| format!("HTTP request failed for {url}"))?;

    anyhow::ensure!(
        response.status().is_success(),
        "download failed with HTTP {}",
        response.status()
    );

    let total_size = response.content_length();
    let pb = if let Some(size) = total_size {
        let pb = ProgressBar::new(size);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
                .context("invalid progress template")?
                .progress_chars("##-"),
        );
        pb
    } else {
        ProgressBar::new_spinner()
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("failed to create temp file: {}", tmp_path.display()))?;

    while let Some(chunk) = response.chunk().await.context("error reading response")? {
        file.write_all(&chunk)
            .await
            .context("error writing to file")?;
        pb.inc(chunk.len() as u64);
    }

    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, dest)
        .await
        .context("failed to rename temp file")?;

    pb.finish_and_clear();
    Ok(())
}
