mod config;
mod logging;
mod shutdown;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use policies::{Environment, PoliciesModule};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;

/// Policy Gateway - OAuth2-fronted access to the upstream policy API
#[derive(Parser)]
#[command(name = "policy-gateway-server")]
#[command(about = "Policy Gateway - OAuth2-fronted access to the upstream policy API")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config
        && !Path::new(path).is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_cli_overrides(cli.port, cli.verbose);

    logging::init_logging(&config.logging);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    let environment = Environment::from_process_env();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, environment).await,
        Commands::Check => check_config(&config, environment),
    }
}

fn check_config(config: &AppConfig, environment: Environment) -> Result<()> {
    tracing::info!("Checking configuration...");
    config.server.bind_addr()?;
    config
        .policies
        .resolve(environment)
        .with_context(|| format!("invalid policies configuration for {environment}"))?;
    println!("Configuration is valid for environment {environment}");
    Ok(())
}

async fn run_server(config: AppConfig, environment: Environment) -> Result<()> {
    let resolved = config
        .policies
        .resolve(environment)
        .with_context(|| format!("invalid policies configuration for {environment}"))?;
    let module = PoliciesModule::new(resolved)?;

    let app = module.router().layer(TraceLayer::new_for_http());

    let addr = config.server.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        address = %addr,
        environment = %environment,
        "Policy Gateway listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "Signal handling failed");
            }
        })
        .await
        .context("server error")?;

    tracing::info!("Policy Gateway stopped");
    Ok(())
}
