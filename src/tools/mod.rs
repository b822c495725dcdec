pub mod brief;
pub mod capture_block;
pub mod capture_session;
pub mod find_related;
pub mod knowledge_stats;
pub mod search_blocks;

use brief::BriefParams;
use capture_block::CaptureBlockParams;
use capture_session::{StartCaptureParams, StopCaptureParams};
use find_related::FindRelatedParams;
use knowledge_stats::KnowledgeStatsParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use search_blocks::SearchBlocksParams;
use std::sync::{Arc, Mutex};

use crate::config::CoeusConfig;
use crate::embedding::SemanticCapability;
use crate::knowledge::brief::BriefPeriod;
use crate::knowledge::capture::{CaptureRequest, CaptureSettings};
use crate::knowledge::session::{SessionState, StateFile};
use crate::knowledge::types::Category;

/// The Coeus MCP tool handler. Holds the shared connection, the semantic
/// capability, the session state with its backing file, and config.
#[derive(Clone)]
pub struct CoeusTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    semantic: SemanticCapability,
    session: Arc<Mutex<SessionState>>,
    state_file: Arc<StateFile>,
    config: Arc<CoeusConfig>,
}

/// Run synchronous knowledge-engine work off the async runtime.
async fn blocking<T, F>(task: F) -> Result<T, String>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("serialization failed: {e}"))
}

fn lock<T>(mutex: &Mutex<T>) -> anyhow::Result<std::sync::MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))
}

/// Run `task` with the connection and the on-disk session state, then save the
/// state. The file is re-read under the lock, so `coeus start` / `coeus stop`
/// run from the CLI while the server is up are not overwritten.
fn with_session<T>(
    db: &Mutex<Connection>,
    session: &Mutex<SessionState>,
    state_file: &StateFile,
    task: impl FnOnce(&mut Connection, &mut SessionState) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let mut conn = lock(db)?;
    let mut state = lock(session)?;
    *state = state_file.load()?;
    let out = task(&mut conn, &mut state)?;
    state_file.save(&state)?;
    Ok(out)
}

#[tool_router]
impl CoeusTools {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        semantic: SemanticCapability,
        session: Arc<Mutex<SessionState>>,
        state_file: Arc<StateFile>,
        config: Arc<CoeusConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            semantic,
            session,
            state_file,
            config,
        }
    }

    fn resolve_limit(&self, limit: Option<usize>) -> Result<usize, String> {
        match limit {
            Some(0) => Err("limit must be at least 1".into()),
            Some(n) => Ok(n),
            None => Ok(self.config.retrieval.default_limit),
        }
    }

    /// Capture a note as a block.
    #[tool(description = "Capture a short note. The type (work_log, journal, idea, research) is inferred unless given; #hashtags become tags; blocks sharing a tag are auto-linked.")]
    async fn capture_block(
        &self,
        Parameters(params): Parameters<CaptureBlockParams>,
    ) -> Result<String, String> {
        let category = params
            .r#type
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()
            .map_err(|e| e.to_string())?;

        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }

        tracing::info!(
            content_len = params.content.len(),
            explicit_type = ?category,
            "capture_block called"
        );

        let request = CaptureRequest {
            content: params.content,
            category,
            tags: params.tags,
            people: params.people.unwrap_or_default(),
            projects: params.projects.unwrap_or_default(),
        };
        let settings = CaptureSettings::from_config(&self.config);
        let db = Arc::clone(&self.db);
        let session = Arc::clone(&self.session);
        let state_file = Arc::clone(&self.state_file);
        let semantic = self.semantic.clone();

        let result = blocking(move || {
            with_session(&db, &session, &state_file, |conn, state| {
                crate::knowledge::capture::capture(conn, &semantic, state, request, &settings)
            })
        })
        .await?;

        to_json(&result)
    }

    /// Hybrid keyword + semantic search.
    #[tool(description = "Search blocks. Exact keyword matches come first; when fewer than 3 match and semantic search is available, similar blocks are appended.")]
    async fn search_blocks(
        &self,
        Parameters(params): Parameters<SearchBlocksParams>,
    ) -> Result<String, String> {
        let limit = self.resolve_limit(params.limit)?;
        tracing::info!(query = %params.query, limit, "search_blocks called");

        let db = Arc::clone(&self.db);
        let semantic = self.semantic.clone();
        let query = params.query;
        let rows = blocking(move || {
            let conn = lock(&db)?;
            crate::knowledge::search::search(&conn, &semantic, &query, limit)
        })
        .await?;

        Ok(serde_json::json!({ "results": rows, "total": rows.len() }).to_string())
    }

    /// Blocks related to a given block by tags and similarity.
    #[tool(description = "Find blocks related to a block id: shared tags score 1.0, similar embeddings score by similarity, and blocks found both ways are boosted.")]
    async fn find_related(
        &self,
        Parameters(params): Parameters<FindRelatedParams>,
    ) -> Result<String, String> {
        let limit = self.resolve_limit(params.limit)?;
        tracing::info!(id = %params.id, limit, "find_related called");

        let db = Arc::clone(&self.db);
        let semantic = self.semantic.clone();
        let id = params.id;
        let rows = blocking(move || {
            let conn = lock(&db)?;
            crate::knowledge::related::find_related(&conn, &semantic, &id, limit)
        })
        .await?;

        Ok(serde_json::json!({ "related": rows, "total": rows.len() }).to_string())
    }

    /// Summary of recent captures.
    #[tool(description = "Brief of captured blocks for 'today', 'yesterday', or 'week', grouped by type.")]
    async fn brief(&self, Parameters(params): Parameters<BriefParams>) -> Result<String, String> {
        let period: BriefPeriod = params
            .period
            .as_deref()
            .unwrap_or("today")
            .parse()
            .map_err(|e: crate::error::ParseError| e.to_string())?;
        tracing::info!(period = %period, "brief called");

        let db = Arc::clone(&self.db);
        let brief = blocking(move || {
            let conn = lock(&db)?;
            crate::knowledge::brief::brief(&conn, period, chrono::Utc::now())
        })
        .await?;

        to_json(&brief)
    }

    /// Counts across the knowledge base.
    #[tool(description = "Knowledge base statistics: blocks per type, tags, links, sessions, embeddings, and whether semantic search is available.")]
    async fn knowledge_stats(
        &self,
        Parameters(_params): Parameters<KnowledgeStatsParams>,
    ) -> Result<String, String> {
        tracing::info!("knowledge_stats called");

        let db = Arc::clone(&self.db);
        let session = Arc::clone(&self.session);
        let state_file = Arc::clone(&self.state_file);
        let semantic = self.semantic.clone();
        let stats = blocking(move || {
            let conn = lock(&db)?;
            let mut state = lock(&session)?;
            *state = state_file.load()?;
            crate::knowledge::stats::stats(&conn, &semantic, &state)
        })
        .await?;

        to_json(&stats)
    }

    /// Open a batch capture session.
    #[tool(description = "Start a batch capture session. Blocks captured until stop_capture are grouped under the session.")]
    async fn start_capture(
        &self,
        Parameters(_params): Parameters<StartCaptureParams>,
    ) -> Result<String, String> {
        let db = Arc::clone(&self.db);
        let session = Arc::clone(&self.session);
        let state_file = Arc::clone(&self.state_file);
        let session_id = blocking(move || {
            with_session(&db, &session, &state_file, |conn, state| {
                crate::knowledge::session::start_capture_mode(conn, state)
            })
        })
        .await?;

        Ok(serde_json::json!({ "session_id": session_id }).to_string())
    }

    /// Close the batch capture session.
    #[tool(description = "Stop the current batch capture session and report how many blocks it collected.")]
    async fn stop_capture(
        &self,
        Parameters(_params): Parameters<StopCaptureParams>,
    ) -> Result<String, String> {
        let db = Arc::clone(&self.db);
        let session = Arc::clone(&self.session);
        let state_file = Arc::clone(&self.state_file);
        let block_count = blocking(move || {
            with_session(&db, &session, &state_file, |conn, state| {
                crate::knowledge::session::stop_capture_mode(conn, state)
            })
        })
        .await?;

        Ok(serde_json::json!({ "block_count": block_count }).to_string())
    }
}

#[tool_handler]
impl ServerHandler for CoeusTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Coeus captures short notes as blocks. Use capture_block to record a note, \
                 search_blocks to look things up, find_related to explore around a block, \
                 and brief for a summary of recent captures."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
