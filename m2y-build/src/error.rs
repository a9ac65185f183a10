//! Error types for the m2y-build server

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment-level failures. A build tool exiting non-zero is not one of
/// these; it is reported through `ExecResult::success`.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Project directory not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("Project path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Project directory is not accessible: {}", .0.display())]
    ProjectInaccessible(PathBuf),

    #[error("Build tool not found: {0}")]
    ToolNotFound(String),

    #[error("Unknown build target: {0} (expected build, clean or force)")]
    InvalidTarget(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BuildError {
    /// Classify an IO failure on the project directory itself
    pub fn for_project_dir(err: std::io::Error, path: &Path) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ProjectNotFound(path.to_path_buf()),
            std::io::ErrorKind::NotADirectory => Self::NotADirectory(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::ProjectInaccessible(path.to_path_buf()),
            _ => Self::IoError(err),
        }
    }

    /// True for failures caused by the caller's environment rather than by
    /// this process.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound(_)
                | Self::NotADirectory(_)
                | Self::ProjectInaccessible(_)
                | Self::ToolNotFound(_)
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BuildError>;
