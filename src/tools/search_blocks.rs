//! MCP `search_blocks` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_blocks` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchBlocksParams {
    /// Free-text query. Every word must appear for an exact match.
    #[schemars(description = "Free-text query. Every word must appear for an exact match.")]
    pub query: String,

    /// Maximum number of results. Defaults to `retrieval.default_limit`.
    #[schemars(description = "Maximum number of results. Defaults to 10.")]
    pub limit: Option<usize>,
}
