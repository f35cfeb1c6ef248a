use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use zonemap_api::config::config;
use zonemap_api::database::store::TransactionalStore;
use zonemap_api::database::{DatabaseManager, MemoryStore, PgStore};
use zonemap_api::{app, AppState};

#[derive(Parser)]
#[command(name = "zonemap", version, about = "Map and zone management API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Listen port; overrides API_PORT / PORT
        #[arg(long)]
        port: Option<u16>,
        /// Use a throwaway in-process store instead of Postgres
        #[arg(long)]
        memory: bool,
    },
    /// Apply sql/schema.sql to DATABASE_URL
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zonemap=info,zonemap_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    info!("Starting Zonemap API in {:?} mode", config.environment);

    let command = Cli::parse().command.unwrap_or(Command::Serve {
        port: None,
        memory: false,
    });

    match command {
        Command::Migrate => {
            let store = connect_postgres().await?;
            DatabaseManager::migrate(store.pool()).await?;
            info!("Schema applied");
            Ok(())
        }
        Command::Serve { port, memory } => {
            let store: Arc<dyn TransactionalStore> = if memory {
                info!("Using in-memory store; data is lost on exit");
                Arc::new(MemoryStore::new())
            } else {
                Arc::new(connect_postgres().await?)
            };
            serve(store, port.unwrap_or(config.api.port)).await
        }
    }
}

async fn connect_postgres() -> anyhow::Result<PgStore> {
    let url = DatabaseManager::database_url()?;
    let pool = DatabaseManager::connect(&url, &config().database)
        .await
        .context("failed to connect to Postgres")?;
    Ok(PgStore::new(pool))
}

async fn serve(store: Arc<dyn TransactionalStore>, port: u16) -> anyhow::Result<()> {
    let app = app(AppState::new(store));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Zonemap API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
