//! MCP `start_capture` / `stop_capture` tool parameter definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `start_capture` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct StartCaptureParams {}

/// Parameters for the `stop_capture` MCP tool.
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct StopCaptureParams {}
