// Main entry point for the profile hub API server

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use server_core::{server::app::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Telegram profile hub API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire the provider connector. The MTProto transport is not part of this
    // service; transport-backed connectors plug in at this composition root.
    let connector: Arc<dyn telegram::Connector> = match config.telegram_transport.as_str() {
        "sandbox" => {
            tracing::warn!("using the in-process sandbox provider; no Telegram traffic leaves this host");
            telegram::sandbox::SandboxTelegram::new().connector()
        }
        other => bail!(
            "TELEGRAM_TRANSPORT '{other}' is not compiled into this binary; \
             only the \"sandbox\" transport ships with the service core"
        ),
    };

    // Build application
    let app = build_app(pool, connector, &config);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
