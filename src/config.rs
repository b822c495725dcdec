use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::knowledge::types::Category;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CoeusConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub linking: LinkingConfig,
    pub capture: CaptureConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub log_level: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
    pub state_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Set to `false` to run without semantic search even when the model is present.
    pub enabled: bool,
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinkingConfig {
    /// Upper bound on auto-link candidates examined per capture.
    pub max_candidates: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptureConfig {
    /// Categories that get a stored summary and an embedding at capture time.
    pub embed_categories: Vec<Category>,
}

impl Default for CoeusConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            embedding: EmbeddingConfig::default(),
            retrieval: RetrievalConfig::default(),
            linking: LinkingConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            log_level: "info".into(),
            host: "127.0.0.1".into(),
            port: 7420,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = default_coeus_dir();
        Self {
            db_path: dir.join("coeus.db").to_string_lossy().into_owned(),
            state_path: dir.join("state.json").to_string_lossy().into_owned(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_coeus_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            enabled: true,
            provider: "local".into(),
            model: "all-MiniLM-L6-v2".into(),
            cache_dir,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self { max_candidates: 10 }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            embed_categories: vec![Category::Research, Category::Idea],
        }
    }
}

/// Returns `~/.coeus/`, or `./.coeus/` when no home directory can be determined.
pub fn default_coeus_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".coeus")
}

/// Returns the default config file path: `~/.coeus/config.toml`
pub fn default_config_path() -> PathBuf {
    default_coeus_dir().join("config.toml")
}

impl CoeusConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            CoeusConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (COEUS_DB, COEUS_STATE, COEUS_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COEUS_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("COEUS_STATE") {
            self.storage.state_path = val;
        }
        if let Ok(val) = std::env::var("COEUS_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    pub fn resolved_state_path(&self) -> PathBuf {
        expand_tilde(&self.storage.state_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CoeusConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.retrieval.default_limit, 10);
        assert_eq!(config.linking.max_candidates, 10);
        assert_eq!(
            config.capture.embed_categories,
            vec![Category::Research, Category::Idea]
        );
        assert!(config.storage.db_path.ends_with("coeus.db"));
        assert!(config.storage.state_path.ends_with("state.json"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[linking]
max_candidates = 25

[capture]
embed_categories = ["research", "idea", "journal"]
"#;
        let config: CoeusConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.linking.max_candidates, 25);
        assert_eq!(config.capture.embed_categories.len(), 3);
        // unset sections keep their defaults
        assert_eq!(config.retrieval.default_limit, 10);
        assert!(config.embedding.enabled);
    }

    #[test]
    fn unknown_category_in_config_is_rejected() {
        let toml_str = r#"
[capture]
embed_categories = ["recipes"]
"#;
        assert!(toml::from_str::<CoeusConfig>(toml_str).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = CoeusConfig::default();
        std::env::set_var("COEUS_DB", "/tmp/override.db");
        std::env::set_var("COEUS_STATE", "/tmp/override-state.json");
        std::env::set_var("COEUS_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.storage.state_path, "/tmp/override-state.json");
        assert_eq!(config.server.log_level, "trace");

        std::env::remove_var("COEUS_DB");
        std::env::remove_var("COEUS_STATE");
        std::env::remove_var("COEUS_LOG_LEVEL");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths_alone() {
        assert_eq!(expand_tilde("/var/coeus.db"), PathBuf::from("/var/coeus.db"));
    }
}
