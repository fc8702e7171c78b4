//! Vitrine server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_core::config::AppConfig;
use vitrine_server::{AppState, create_router};

/// Vitrine - a signed-access gateway for S3-backed media
#[derive(Parser, Debug)]
#[command(name = "vitrined")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "VITRINE_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Vitrine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // VITRINE_CONFIG is just the file path, not configuration content
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("VITRINE_") && key != "VITRINE_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: vitrined --config /path/to/config.toml\n  \
             2. Environment variables: VITRINE_SERVER__BIND=0.0.0.0:8080 \
             VITRINE_ACCESS__HASH_SALTS='[\"your-salt\"]' vitrined\n\n\
             See config/server.example.toml for example configuration.\n\
             Set VITRINE_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("VITRINE_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    config
        .access
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid access configuration")?;

    // Initialize the object store gateway
    let gateway = vitrine_storage::from_config(&config.storage)
        .await
        .context("failed to initialize object store gateway")?;
    tracing::info!(backend = gateway.backend_name(), "Object store gateway initialized");

    // Verify object store connectivity before accepting requests, so the
    // server never reports healthy while the store is unreachable.
    gateway
        .health_check()
        .await
        .context("object store health check failed")?;
    tracing::info!("Object store connectivity verified");

    tracing::info!(
        salts = config.access.hash_salts.len(),
        allowed_first_paths = ?config.access.allowed_first_paths,
        "Access configuration loaded"
    );

    let state = AppState::new(config.clone(), gateway);
    let app = create_router(state);

    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
