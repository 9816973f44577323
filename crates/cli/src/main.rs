//! ciprobe CLI - Main Entry Point
//!
//! Inspect builds on a CI server, wait for them to finish and assert on
//! their results from a shell or a pipeline step.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use ciprobe_common::HarnessConfig;
use ciprobe_e2e::Session;
use commands::{artifacts, changes, console, status, wait};

/// ciprobe - follow CI builds from the command line
#[derive(Parser)]
#[command(name = "ciprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.ciprobe/config.toml)
    #[arg(long, global = true, env = "CIPROBE_CONFIG")]
    config: Option<PathBuf>,

    /// CI server root URL; overrides the config file
    #[arg(long, global = true, env = "CIPROBE_BASE_URL")]
    base_url: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current status of a build
    Status(status::StatusArgs),

    /// Wait for a build to finish, optionally checking its result
    Wait(wait::WaitArgs),

    /// Print or check a build's console log
    Console(console::ConsoleArgs),

    /// List or read a build's archived artifacts
    Artifacts(artifacts::ArtifactsArgs),

    /// List the source changes recorded against a build
    Changes(changes::ChangesArgs),

    /// Show version information
    Version,
}

fn load_config(cli: &Cli) -> anyhow::Result<HarnessConfig> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(ciprobe_common::default_config_path);
    let mut config = HarnessConfig::load(&path)
        .with_context(|| format!("failed to load config from {}", path.display()))?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("ciprobe v{}", ciprobe_common::VERSION);
        return Ok(());
    }

    let config = load_config(&cli)?;
    let session = Session::connect(&config)
        .with_context(|| format!("cannot talk to {}", config.base_url))?;
    tracing::debug!(?session, "session ready");

    let passed = match cli.command {
        Commands::Status(args) => status::execute(args, &session, cli.format).await.map(|_| true)?,
        Commands::Wait(args) => wait::execute(args, &session, cli.format).await?,
        Commands::Console(args) => console::execute(args, &session).await?,
        Commands::Artifacts(args) => artifacts::execute(args, &session, cli.format).await.map(|_| true)?,
        Commands::Changes(args) => changes::execute(args, &session, cli.format).await.map(|_| true)?,
        Commands::Version => true,
    };

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
