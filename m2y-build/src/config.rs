//! Configuration for the m2y-build server

use std::path::{Path, PathBuf};
use clap::Parser;

use crate::builder::{Target, DEFAULT_MAKE_PROGRAM, DEFAULT_NAME};

/// Environment variable consulted when `--project` is not given
pub const PROJECT_PATH_ENV: &str = "M2Y_PROJECT_PATH";

/// How many parent directories to search for a Makefile
const MAX_SEARCH_DEPTH: usize = 10;

pub const DEFAULT_MAX_OUTPUT_LINES: usize = 400;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "m2y-build")]
#[command(about = "Run the M2Y project's make targets, as an MCP server or one-shot")]
#[command(version)]
pub struct Args {
    /// Run this target once and exit instead of serving MCP over stdio
    #[arg(value_enum)]
    pub target: Option<Target>,

    /// Project directory containing the Makefile
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Build tool program
    #[arg(long, default_value = DEFAULT_MAKE_PROGRAM)]
    pub make: String,

    /// Builder name shown in log lines
    #[arg(long, default_value = DEFAULT_NAME)]
    pub name: String,

    /// Truncate tool output beyond this many lines in MCP responses
    #[arg(long, default_value_t = DEFAULT_MAX_OUTPUT_LINES)]
    pub max_output_lines: usize,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file path (defaults to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Runtime configuration derived from CLI args
#[derive(Debug, Clone)]
pub struct Config {
    pub project_path: PathBuf,
    pub make_program: String,
    pub name: String,
    pub max_output_lines: usize,
}

impl Config {
    pub fn from_args(args: &Args) -> Self {
        Self {
            project_path: resolve_project_path(args.project.as_deref()),
            make_program: args.make.clone(),
            name: args.name.clone(),
            max_output_lines: args.max_output_lines,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_path: PathBuf::from("."),
            make_program: DEFAULT_MAKE_PROGRAM.to_string(),
            name: DEFAULT_NAME.to_string(),
            max_output_lines: DEFAULT_MAX_OUTPUT_LINES,
        }
    }
}

/// Pick the project directory: explicit path, then `M2Y_PROJECT_PATH`, then
/// the nearest ancestor of the current directory with a Makefile, then the
/// current directory itself. Existence is not checked here.
pub fn resolve_project_path(explicit: Option<&Path>) -> PathBuf {
    resolve_from(
        explicit,
        std::env::var(PROJECT_PATH_ENV).ok(),
        std::env::current_dir().ok(),
    )
}

fn resolve_from(explicit: Option<&Path>, env_path: Option<String>, cwd: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(path) = env_path.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    match cwd {
        Some(cwd) => find_project_root(&cwd).unwrap_or(cwd),
        None => PathBuf::from("."),
    }
}

/// Walk up from `start` looking for a directory that contains a Makefile
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    for _ in 0..MAX_SEARCH_DEPTH {
        if current.join("Makefile").is_file() {
            return Some(current);
        }
        if !current.pop() {
            break;
        }
    }
    None
}
