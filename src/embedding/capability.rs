//! The semantic capability flag.
//!
//! Semantic search needs two things: sqlite-vec loaded on the connection and a
//! working encoder. [`SemanticCapability::resolve`] checks both once at startup.
//! When either is missing it logs a single warning and every semantic step in the
//! knowledge engine becomes a skip.

use std::sync::Arc;

use rusqlite::Connection;

use super::EmbeddingProvider;
use crate::config::EmbeddingConfig;

/// Whether semantic search is available, and the encoder to use when it is.
#[derive(Clone)]
pub struct SemanticCapability {
    encoder: Option<Arc<dyn EmbeddingProvider>>,
    model: String,
}

impl SemanticCapability {
    /// `model` names the encoder; it is recorded with the first stored vector.
    pub fn available(encoder: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            encoder: Some(encoder),
            model: model.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            encoder: None,
            model: String::new(),
        }
    }

    /// Probe the vector extension and load the configured encoder.
    pub fn resolve(conn: &Connection, config: &EmbeddingConfig) -> Self {
        if !config.enabled {
            tracing::info!("semantic search disabled by configuration");
            return Self::unavailable();
        }

        let Some(vec_version) = crate::db::sqlite_vec_version(conn) else {
            tracing::warn!("sqlite-vec not available; semantic search disabled");
            return Self::unavailable();
        };

        match super::create_provider(config) {
            Ok(provider) => {
                tracing::info!(sqlite_vec = %vec_version, model = %config.model, "semantic search ready");
                Self::available(Arc::from(provider), config.model.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "embedding encoder not available; semantic search disabled");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.encoder.is_some()
    }

    /// Name of the encoder model, when one is loaded.
    pub fn model(&self) -> Option<&str> {
        self.encoder.as_ref().map(|_| self.model.as_str())
    }

    /// Encode `text`, or `None` when the capability is off or the encoder fails.
    /// Failures are logged and never surface to the caller.
    pub fn encode(&self, text: &str) -> Option<Vec<f32>> {
        let encoder = self.encoder.as_ref()?;
        match encoder.embed(text) {
            Ok(vector) if vector.len() == encoder.dimensions() => Some(vector),
            Ok(vector) => {
                tracing::warn!(
                    got = vector.len(),
                    expected = encoder.dimensions(),
                    "encoder returned a vector of the wrong size"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "embedding generation failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for SemanticCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticCapability")
            .field("available", &self.is_available())
            .field("model", &self.model())
            .finish()
    }
}
