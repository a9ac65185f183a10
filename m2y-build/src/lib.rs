//! M2Y Build MCP Server
//!
//! Thin wrapper that runs the M2Y project's `make` targets (build, clean,
//! force) in a fixed project directory, served over MCP or run once from
//! the command line.

pub mod builder;
pub mod config;
pub mod error;
pub mod exec;
pub mod tools;

pub use builder::{Builder, Target};
pub use config::{Args, Config};
pub use error::{BuildError, Result};
pub use exec::{CommandRunner, ExecRequest, ExecResult, ProcessRunner};
pub use tools::M2yBuildToolHandler;
