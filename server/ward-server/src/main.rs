use anyhow::{Context, Result};
use clap::Parser;
use std::{env, net::SocketAddr};
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ward_server::config::{WardConfig, DEFAULT_CONFIG_FILE};
use ward_server::{create_app, WardServer};

/// Ward IV billing HTTP server
#[derive(Parser, Debug)]
#[command(name = "ward-server")]
#[command(about = "Ward IV billing and discharge HTTP API server")]
struct Args {
    /// Server bind address (overrides configuration)
    #[arg(long, env = "WARD_HOST")]
    host: Option<String>,

    /// Server port (overrides configuration and BACKEND_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Keep all data in memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to read .env file");
        }
    }

    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = WardConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    info!("Starting ward billing server");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let server = if args.in_memory {
        WardServer::in_memory(config.clone())?
    } else {
        WardServer::new(config.clone()).await?
    };

    let db_pool = server.db_pool.clone();
    let app = create_app(server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Ward billing server running on http://{}", addr);
    info!("Health check available at: http://{}/health", addr);
    info!("OpenAPI document at: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }
    info!("Server stopped");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let is_production = env::var("WARD_ENV").map_or(false, |value| value == "production");

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "ward_server={level},billing_service={level},database_layer={level},tower_http=info,sqlx=warn"
        )
        .into()
    });

    if is_production {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).with_ansi(false).json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
