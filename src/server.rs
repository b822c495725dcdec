//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that wire up the
//! database, semantic capability, session state, and MCP tool handler into a
//! running server.

use crate::config::CoeusConfig;
use crate::db;
use crate::embedding::SemanticCapability;
use crate::knowledge::session::{SessionState, StateFile};
use crate::tools::CoeusTools;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Everything the tool handler shares across requests.
struct SharedState {
    db: Arc<Mutex<rusqlite::Connection>>,
    semantic: SemanticCapability,
    session: Arc<Mutex<SessionState>>,
    state_file: Arc<StateFile>,
    config: Arc<CoeusConfig>,
}

impl SharedState {
    fn tools(&self) -> CoeusTools {
        CoeusTools::new(
            Arc::clone(&self.db),
            self.semantic.clone(),
            Arc::clone(&self.session),
            Arc::clone(&self.state_file),
            Arc::clone(&self.config),
        )
    }
}

/// Open the database, resolve semantic search once, load session state.
fn setup_shared_state(config: CoeusConfig) -> Result<SharedState> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    if let Ok(Some(stored_model)) = db::migrations::get_embedding_model(&conn) {
        if stored_model != config.embedding.model {
            tracing::warn!(
                stored = %stored_model,
                configured = %config.embedding.model,
                "embedding model differs from the one stored vectors were built with"
            );
        }
    }

    let semantic = SemanticCapability::resolve(&conn, &config.embedding);

    let state_file = StateFile::new(config.resolved_state_path());
    let session = state_file.load()?;
    tracing::info!(
        state = %state_file.path().display(),
        capture_mode = session.capture_mode,
        "session state loaded"
    );

    Ok(SharedState {
        db: Arc::new(Mutex::new(conn)),
        semantic,
        session: Arc::new(Mutex::new(session)),
        state_file: Arc::new(state_file),
        config: Arc::new(config),
    })
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: CoeusConfig) -> Result<()> {
    tracing::info!("starting Coeus MCP server on stdio");

    let shared = setup_shared_state(config)?;
    let server = shared.tools().serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over streamable HTTP at `/mcp`.
pub async fn serve_http(config: CoeusConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(addr = %bind_addr, "starting Coeus MCP server on HTTP");

    let shared = Arc::new(setup_shared_state(config)?);

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(shared.tools()),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
