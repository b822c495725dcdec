//! Text-to-vector encoders.
//!
//! [`EmbeddingProvider`] is the encoder seam; [`local::LocalEmbeddingProvider`]
//! runs all-MiniLM-L6-v2 through ONNX Runtime. Whether semantic search can run at
//! all is decided once at startup and carried around as a [`SemanticCapability`].

pub mod capability;
pub mod local;

use anyhow::Result;

pub use capability::SemanticCapability;

/// Number of dimensions in the embedding vectors (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Encodes text into L2-normalized vectors of [`EMBEDDING_DIM`] dimensions.
///
/// Calls are synchronous; async callers go through `tokio::task::spawn_blocking`.
pub trait EmbeddingProvider: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Only `"local"` is supported. Fails when the model files are missing; run
/// `coeus model download` first.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => {
            let provider = local::LocalEmbeddingProvider::new(config)?;
            Ok(Box::new(provider))
        }
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local"),
    }
}

/// View an f32 vector as raw native-endian bytes, the layout sqlite-vec reads.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}

/// Inverse of [`embedding_to_bytes`] for blobs read back out of `block_embeddings`.
pub fn embedding_from_bytes(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
