//! Type definitions for m2y-build MCP tools

use serde::{Deserialize, Serialize};
use schemars::JsonSchema;

// ============================================================================
// build / clean / force_build
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct TargetArgs {
    /// Override the output line limit for this call (0 disables truncation)
    #[serde(default)]
    pub max_output_lines: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TargetResult {
    pub success: bool,
    /// Target name ("build", "clean" or "force")
    pub target: String,
    /// Command as dispatched, e.g. "make build"
    pub command: String,
    pub project_path: String,
    /// -1 when the build tool was killed by a signal
    pub exit_code: i32,
    /// Combined stdout and stderr, possibly truncated
    pub output: String,
    pub duration_ms: u64,
    /// Correlates this response with server log lines
    pub run_id: String,
}

// ============================================================================
// project_info
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ProjectInfoArgs {}

#[derive(Debug, Serialize)]
pub struct ProjectInfoResult {
    pub name: String,
    pub project_path: String,
    pub exists: bool,
    pub has_makefile: bool,
    pub make_program: String,
    /// Available targets with the command each one runs
    pub targets: Vec<TargetInfo>,
}

#[derive(Debug, Serialize)]
pub struct TargetInfo {
    pub tool: String,
    pub command: String,
    pub description: String,
}
