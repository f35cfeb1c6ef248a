use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, Executor, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::store::StoreError;

/// Bundled schema, applied by `zonemap migrate`
pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Builds and prepares the shared Postgres connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Read DATABASE_URL from the environment
    pub fn database_url() -> Result<String, StoreError> {
        std::env::var("DATABASE_URL").map_err(|_| StoreError::ConfigMissing("DATABASE_URL"))
    }

    /// Connect a bounded pool. Every connection gets the configured
    /// statement timeout so a stuck statement aborts its transaction.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<PgPool, StoreError> {
        let mut options = PgConnectOptions::from_str(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if !config.enable_query_logging {
            options = options.disable_statement_logging();
        }

        let statement_timeout_ms = config.statement_timeout_ms;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    let sql = format!("SET statement_timeout = {}", statement_timeout_ms);
                    conn.execute(sql.as_str()).await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        info!(
            "Created database pool for {} (max {} connections)",
            Self::redacted_url(url)?,
            config.max_connections
        );
        Ok(pool)
    }

    /// Apply the bundled schema. Idempotent.
    pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
        pool.execute(SCHEMA_SQL).await?;
        info!("Applied database schema");
        Ok(())
    }

    /// Connection string safe for logs
    pub fn redacted_url(url: &str) -> Result<String, StoreError> {
        let mut parsed = url::Url::parse(url).map_err(|_| StoreError::InvalidDatabaseUrl)?;
        if parsed.password().is_some() {
            parsed
                .set_password(Some("***"))
                .map_err(|_| StoreError::InvalidDatabaseUrl)?;
        }
        Ok(parsed.into())
    }
}
