//! RMCP 0.3.2 implementation for m2y-build MCP tools
//!
//! Provides 4 tools: build, clean, force_build and project_info.

use rmcp::{
    tool, tool_router, tool_handler, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    ErrorData as McpError,
    service::RequestContext,
    RoleServer,
};
use tracing::{debug, info};
use std::future::Future;

use super::types::*;
use crate::builder::{Builder, Target};
use crate::config::Config;
use crate::error::BuildError;

const TOOL_COUNT: usize = 4;

/// MCP tool name for a target
pub fn tool_name(target: Target) -> &'static str {
    match target {
        Target::Build => "build",
        Target::Clean => "clean",
        Target::Force => "force_build",
    }
}

/// m2y-build tool handler
#[derive(Clone)]
pub struct M2yBuildToolHandler {
    #[allow(dead_code)]
    tool_router: ToolRouter<M2yBuildToolHandler>,
    config: Config,
    builder: Builder,
}

impl M2yBuildToolHandler {
    pub fn new(config: Config) -> Self {
        let builder = Builder::from_config(&config);
        Self::with_builder(config, builder)
    }

    pub fn with_builder(config: Config, builder: Builder) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config,
            builder,
        }
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    async fn run_target(&self, target: Target, max_output_lines: Option<usize>) -> Result<CallToolResult, McpError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        info!("Run {}: {} in {}", run_id, target.description(), self.builder.project_path().display());

        let request = self.builder.request(target);
        let result = self.builder.run(target).await.map_err(to_mcp_error)?;

        let limit = max_output_lines.unwrap_or(self.config.max_output_lines);
        let result = TargetResult {
            success: result.success,
            target: target.to_string(),
            command: request.command_line(),
            project_path: self.builder.project_path().display().to_string(),
            exit_code: result.exit_code,
            output: truncate_output(&result.output(), limit),
            duration_ms: result.duration_ms,
            run_id,
        };

        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| to_mcp_error(BuildError::from(e)))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

impl Default for M2yBuildToolHandler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn to_mcp_error(err: BuildError) -> McpError {
    if err.is_environment() {
        McpError::invalid_params(err.to_string(), None)
    } else {
        McpError::internal_error(err.to_string(), None)
    }
}

/// Keep the first and last lines of long build logs; `max_lines == 0` keeps everything
fn truncate_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();
    if max_lines == 0 || lines.len() <= max_lines {
        return output.to_string();
    }
    let head = max_lines / 5;
    let tail = max_lines - head;

    let mut result = lines[..head].join("\n");
    result.push_str(&format!(
        "\n\n... ({} lines omitted) ...\n\n",
        lines.len() - head - tail
    ));
    result.push_str(&lines[lines.len() - tail..].join("\n"));
    result
}

#[tool_router]
impl M2yBuildToolHandler {
    #[tool(description = "Run `make build` in the project directory")]
    async fn build(&self, Parameters(args): Parameters<TargetArgs>) -> Result<CallToolResult, McpError> {
        self.run_target(Target::Build, args.max_output_lines).await
    }

    #[tool(description = "Run `make clean` in the project directory")]
    async fn clean(&self, Parameters(args): Parameters<TargetArgs>) -> Result<CallToolResult, McpError> {
        self.run_target(Target::Clean, args.max_output_lines).await
    }

    #[tool(description = "Run `make force` (full rebuild) in the project directory")]
    async fn force_build(&self, Parameters(args): Parameters<TargetArgs>) -> Result<CallToolResult, McpError> {
        self.run_target(Target::Force, args.max_output_lines).await
    }

    #[tool(description = "Show the project directory, build tool and available targets")]
    async fn project_info(&self, Parameters(_args): Parameters<ProjectInfoArgs>) -> Result<CallToolResult, McpError> {
        debug!("Reporting project info");

        let path = self.builder.project_path();
        let targets = Target::ALL
            .iter()
            .map(|&t| TargetInfo {
                tool: tool_name(t).to_string(),
                command: self.builder.request(t).command_line(),
                description: t.description().to_string(),
            })
            .collect();

        let result = ProjectInfoResult {
            name: self.builder.name().to_string(),
            project_path: path.display().to_string(),
            exists: path.is_dir(),
            has_makefile: path.join("Makefile").is_file(),
            make_program: self.builder.make_program().to_string(),
            targets,
        };

        let json = serde_json::to_string_pretty(&result)
            .map_err(|e| to_mcp_error(BuildError::from(e)))?;

        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for M2yBuildToolHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "M2Y Build MCP Server - runs the project's make targets in {}. \
                 {} tools available: build, clean, force_build, project_info.",
                self.builder.project_path().display(),
                TOOL_COUNT,
            )),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        info!("M2Y Build MCP server initialized with {} tools", TOOL_COUNT);
        Ok(self.get_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::tests::RecordingRunner;
    use rmcp::handler::server::tool::Parameters;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Extract JSON text from a CallToolResult's first content element
    fn extract_json(result: &CallToolResult) -> serde_json::Value {
        let text = &result.content[0].as_text().expect("expected text content").text;
        serde_json::from_str(text).expect("expected valid JSON")
    }

    fn handler_with(path: &std::path::Path, runner: Arc<RecordingRunner>) -> M2yBuildToolHandler {
        let config = Config {
            project_path: path.to_path_buf(),
            ..Config::default()
        };
        let builder = Builder::from_config(&config).with_runner(runner);
        M2yBuildToolHandler::with_builder(config, builder)
    }

    #[test]
    fn test_handler_construction() {
        let handler = M2yBuildToolHandler::default();
        assert_eq!(handler.builder().name(), "M2Y");
        assert_eq!(handler.builder().make_program(), "make");
    }

    #[test]
    fn test_server_info() {
        let handler = M2yBuildToolHandler::default();
        let instructions = handler.get_info().instructions.unwrap();
        assert!(instructions.contains("4 tools"));
        assert!(instructions.contains("force_build"));
        assert!(instructions.contains("project_info"));
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(tool_name(Target::Build), "build");
        assert_eq!(tool_name(Target::Clean), "clean");
        assert_eq!(tool_name(Target::Force), "force_build");
    }

    #[tokio::test]
    async fn test_build_success() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::succeeding();
        let handler = handler_with(tmp.path(), runner.clone());

        let result = handler.build(Parameters(TargetArgs::default())).await.unwrap();
        let parsed = extract_json(&result);

        assert!(parsed["success"].as_bool().unwrap());
        assert_eq!(parsed["target"], "build");
        assert_eq!(parsed["command"], "make build");
        assert_eq!(parsed["exit_code"], 0);
        assert_eq!(parsed["output"], "ok\n");
        assert!(!parsed["run_id"].as_str().unwrap().is_empty());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_force_build_failure_is_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        let runner = RecordingRunner::with_exit(2, "", "make: *** No rule to make target 'force'.  Stop.\n");
        let handler = handler_with(tmp.path(), runner.clone());

        let result = handler.force_build(Parameters(TargetArgs::default())).await.unwrap();
        let parsed = extract_json(&result);

        assert!(!parsed["success"].as_bool().unwrap());
        assert_eq!(parsed["target"], "force");
        assert_eq!(parsed["command"], "make force");
        assert_eq!(parsed["exit_code"], 2);
        assert!(parsed["output"].as_str().unwrap().contains("No rule to make target"));
        assert_eq!(runner.calls()[0].cwd, tmp.path());
    }

    #[tokio::test]
    async fn test_clean_missing_project_dir() {
        let runner = RecordingRunner::succeeding();
        let handler = handler_with(std::path::Path::new("/tmp/m2y_nonexistent_project_xyz"), runner.clone());

        let result = handler.clean(Parameters(TargetArgs::default())).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Project directory not found"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_output_truncated_per_call() {
        let tmp = TempDir::new().unwrap();
        let log: String = (0..50).map(|i| format!("step {}\n", i)).collect();
        let runner = RecordingRunner::with_exit(0, &log, "");
        let handler = handler_with(tmp.path(), runner);

        let result = handler
            .build(Parameters(TargetArgs { max_output_lines: Some(10) }))
            .await
            .unwrap();
        let output = extract_json(&result)["output"].as_str().unwrap().to_string();

        assert!(output.contains("step 0"));
        assert!(output.contains("40 lines omitted"));
        assert!(output.contains("step 49"));
        assert!(!output.contains("step 20\n"));
    }

    #[tokio::test]
    async fn test_project_info() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("Makefile"), "build:\n\tgo build ./...\n").unwrap();
        let handler = handler_with(tmp.path(), RecordingRunner::succeeding());

        let result = handler.project_info(Parameters(ProjectInfoArgs::default())).await.unwrap();
        let parsed = extract_json(&result);

        assert_eq!(parsed["name"], "M2Y");
        assert!(parsed["exists"].as_bool().unwrap());
        assert!(parsed["has_makefile"].as_bool().unwrap());
        let targets = parsed["targets"].as_array().unwrap();
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[2]["tool"], "force_build");
        assert_eq!(targets[2]["command"], "make force");
        assert_eq!(targets[2]["description"], "force build");
    }

    #[tokio::test]
    async fn test_project_info_missing_dir() {
        let handler = handler_with(
            std::path::Path::new("/tmp/m2y_nonexistent_project_xyz"),
            RecordingRunner::succeeding(),
        );

        let result = handler.project_info(Parameters(ProjectInfoArgs::default())).await.unwrap();
        let parsed = extract_json(&result);
        assert!(!parsed["exists"].as_bool().unwrap());
        assert!(!parsed["has_makefile"].as_bool().unwrap());
    }

    #[test]
    fn test_truncate_output_short() {
        let input = "line1\nline2\nline3";
        assert_eq!(truncate_output(input, 400), input);
        assert_eq!(truncate_output(input, 0), input);
    }

    #[test]
    fn test_truncate_output_long() {
        let lines: Vec<String> = (0..200).map(|i| format!("line {}", i)).collect();
        let input = lines.join("\n");
        let result = truncate_output(&input, 10);
        assert!(result.contains("line 0"));
        assert!(result.contains("line 1\n"));
        assert!(result.contains("190 lines omitted"));
        assert!(result.contains("line 192"));
        assert!(result.contains("line 199"));
    }
}
