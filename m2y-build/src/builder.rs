//! M2Y project builder
//!
//! Maps the three build intents onto `make` targets and runs them in the
//! project directory through the execution helper.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{BuildError, Result};
use crate::exec::{exec_cmd, CommandRunner, ExecRequest, ExecResult, ProcessRunner};

pub const DEFAULT_NAME: &str = "M2Y";
pub const DEFAULT_MAKE_PROGRAM: &str = "make";

/// A build tool target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Target {
    Build,
    Clean,
    #[value(alias = "force-build", alias = "force_build")]
    Force,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Build, Target::Clean, Target::Force];

    /// Argument passed to the build tool
    pub fn make_target(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Force => "force",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Clean => "clean",
            Self::Force => "force build",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.make_target())
    }
}

impl FromStr for Target {
    type Err = BuildError;

    /// Same names the CLI accepts, case-insensitive
    fn from_str(s: &str) -> Result<Self> {
        <Self as clap::ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| BuildError::InvalidTarget(s.to_string()))
    }
}

/// Runs make targets in a fixed project directory.
///
/// The directory is set at construction and never changes. It is checked
/// before every dispatch rather than at construction, so a builder may be
/// created before the project is checked out.
#[derive(Clone)]
pub struct Builder {
    name: String,
    project_path: PathBuf,
    make_program: String,
    runner: Arc<dyn CommandRunner>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("name", &self.name)
            .field("project_path", &self.project_path)
            .field("make_program", &self.make_program)
            .finish_non_exhaustive()
    }
}

impl Builder {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            project_path: project_path.into(),
            make_program: DEFAULT_MAKE_PROGRAM.to_string(),
            runner: Arc::new(ProcessRunner),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.project_path.clone())
            .with_name(config.name.clone())
            .with_make_program(config.make_program.clone())
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_make_program(mut self, program: impl Into<String>) -> Self {
        self.make_program = program.into();
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn make_program(&self) -> &str {
        &self.make_program
    }

    pub async fn build(&self) -> Result<ExecResult> {
        self.run(Target::Build).await
    }

    pub async fn clean(&self) -> Result<ExecResult> {
        self.run(Target::Clean).await
    }

    pub async fn force_build(&self) -> Result<ExecResult> {
        self.run(Target::Force).await
    }

    pub async fn run(&self, target: Target) -> Result<ExecResult> {
        self.check_project_dir()?;
        exec_cmd(self.runner.as_ref(), &self.name, &self.request(target)).await
    }

    /// The command `target` would dispatch
    pub fn request(&self, target: Target) -> ExecRequest {
        ExecRequest {
            program: self.make_program.clone(),
            args: vec![target.make_target().to_string()],
            cwd: self.project_path.clone(),
            description: target.description().to_string(),
        }
    }

    pub fn check_project_dir(&self) -> Result<()> {
        let metadata = std::fs::metadata(&self.project_path)
            .map_err(|e| BuildError::for_project_dir(e, &self.project_path))?;

        if !metadata.is_dir() {
            return Err(BuildError::NotADirectory(self.project_path.clone()));
        }
        Ok(())
    }
}
