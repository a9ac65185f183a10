//! M2Y Build MCP Server — Main Entry Point

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, error, debug};
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter};
use rmcp::{ServiceExt, transport::stdio};

use m2y_build::{Args, Builder, Config, M2yBuildToolHandler, Target};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = Config::from_args(&args);

    if let Some(target) = args.target {
        let code = run_once(&config, target).await?;
        std::process::exit(code);
    }

    info!("Starting M2Y Build MCP Server v{}", env!("CARGO_PKG_VERSION"));
    info!("Project directory: {}", config.project_path.display());

    let service = M2yBuildToolHandler::new(config)
        .serve(stdio()).await.inspect_err(|e| {
            error!("Serving error: {:?}", e);
        })?;

    service.waiting().await?;
    Ok(())
}

/// Run one target, echo its output and return the process exit code
async fn run_once(config: &Config, target: Target) -> Result<i32, Box<dyn std::error::Error>> {
    let builder = Builder::from_config(config);

    match builder.run(target).await {
        Ok(result) => {
            std::io::stdout().write_all(result.stdout.as_bytes())?;
            std::io::stderr().write_all(result.stderr.as_bytes())?;
            Ok(if result.success { 0 } else { result.exit_code.max(1) })
        }
        Err(e) => {
            error!("{} failed: {}", target.description(), e);
            Ok(1)
        }
    }
}

/// Log to stderr, or append to `--log-file` (without ANSI colours).
/// `RUST_LOG` overrides `--log-level` when it parses.
fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))?;

    let writer = match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(args.log_file.is_none())
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    match &args.log_file {
        Some(path) => debug!("Logging to {} at level {}", path.display(), args.log_level),
        None => debug!("Logging to stderr at level {}", args.log_level),
    }
    Ok(())
}
