//! m2y-build MCP tools module

pub mod build_tools;
pub mod types;

pub use build_tools::*;
pub use types::*;
