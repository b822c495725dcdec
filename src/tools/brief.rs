//! MCP `brief` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `brief` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BriefParams {
    /// `"today"`, `"yesterday"`, or `"week"`. Defaults to `"today"`.
    #[schemars(description = "Period: 'today', 'yesterday', or 'week'. Defaults to 'today'.")]
    pub period: Option<String>,
}
