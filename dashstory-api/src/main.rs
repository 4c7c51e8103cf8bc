//! dashstory-api - Dashboard narration microservice
//!
//! Accepts dashboard panel data or screenshots, produces a structured
//! interpretation through an external inference backend and renders the
//! summary to speech.
//!
//! Default port: 5780. Runs in demo mode (canned answers) when no inference
//! API key is configured.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing::{error, info};

use dashstory_api::auth::TokenAuthority;
use dashstory_api::config::{ConfigOverrides, ServiceConfig};
use dashstory_api::services::LocalAudioStore;
use dashstory_api::AppState;

/// Command-line arguments for dashstory-api
#[derive(Parser, Debug)]
#[command(name = "dashstory-api")]
#[command(about = "Dashboard narration microservice")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Inference backend API key (omit for demo mode)
    #[arg(long)]
    api_key: Option<String>,

    /// Directory synthesized audio is written to
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,

    /// Print a signed access token for the configured JWT secret
    IssueToken {
        /// Organization id
        #[arg(long)]
        org: String,

        /// User id (token subject)
        #[arg(long, default_value = "cli")]
        user: String,

        /// Role ("admin" may manage API keys)
        #[arg(long, default_value = "user")]
        role: String,

        /// Comma-separated scopes
        #[arg(long, value_delimiter = ',')]
        scopes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = dashstory_common::config::load_bootstrap_config(args.config.as_deref())
        .context("Failed to load configuration file")?;
    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        api_key: args.api_key,
        audio_dir: args.audio_dir,
        log_level: args.log_level,
    };

    // Tracing first so config resolution is logged; log level comes from the
    // file/env/CLI tiers and is re-read below
    let log_level = overrides
        .log_level
        .clone()
        .or_else(|| dashstory_common::config::env_value(dashstory_api::config::ENV_LOG_LEVEL))
        .unwrap_or_else(|| toml_config.logging.level.clone());
    dashstory_common::logging::init_tracing(&log_level)?;

    info!(
        "dashstory-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServiceConfig::resolve(&toml_config, &overrides)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::IssueToken {
            org,
            user,
            role,
            scopes,
        } => issue_token(&config, &org, &user, &role, scopes),
    }
}

fn issue_token(
    config: &ServiceConfig,
    org: &str,
    user: &str,
    role: &str,
    scopes: Vec<String>,
) -> Result<()> {
    let Some(secret) = config.jwt_secret.as_deref() else {
        bail!("No JWT secret configured; set DASHSTORY_JWT_SECRET or [auth] jwt_secret");
    };

    let authority =
        TokenAuthority::new(secret, config.token_ttl_minutes, config.api_key_ttl_days);
    let token = authority.issue_access_token(user, org, role, scopes)?;
    println!("{}", token);
    Ok(())
}

async fn serve(config: ServiceConfig) -> Result<()> {
    info!("Starting dashstory-api (Dashboard Narration) microservice");
    info!("Audio directory: {}", config.audio_dir.display());
    if config.demo_mode() {
        info!("Demo mode: inference and speech return sample content");
    }

    LocalAudioStore::new(config.audio_dir.clone(), config.audio_public_path.clone())
        .ensure_dir()
        .await
        .context("Failed to create audio directory")?;

    let bind_address = config.bind_address();
    let state = AppState::from_config(config).context("Failed to initialize inference gateway")?;
    let app = dashstory_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
