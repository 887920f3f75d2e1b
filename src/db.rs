//! Database connection pool for the eventosnow backend.
//!
//! Postgres in production; the same code path also opens SQLite URLs,
//! which the test suite uses.

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::AppConfig;

const IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const MAX_LIFETIME: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("database unreachable after {attempts} attempt(s): {source}")]
    ConnectionFailed {
        attempts: u32,
        source: sea_orm::DbErr,
    },
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
}

fn connect_options(cfg: &AppConfig) -> ConnectOptions {
    let mut options = ConnectOptions::new(&cfg.database_url);
    options
        .max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);
    options
}

/// Opens the pool, making up to `db_connect_retries` attempts with the delay
/// doubling from `db_connect_retry_delay_ms` between them.
///
/// ```no_run
/// use eventosnow::{config::AppConfig, db::init_pool};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let db = init_pool(&AppConfig::default()).await?;
///     Ok(())
/// }
/// ```
pub async fn init_pool(cfg: &AppConfig) -> Result<DatabaseConnection> {
    if cfg.database_url.is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "database URL cannot be empty".to_string(),
        }
        .into());
    }

    let options = connect_options(cfg);
    let attempts = cfg.db_connect_retries.max(1);
    let mut delay = Duration::from_millis(cfg.db_connect_retry_delay_ms);
    let mut attempt = 1;

    loop {
        match Database::connect(options.clone()).await {
            Ok(db) => {
                tracing::info!(attempt, "database connected");
                return Ok(db);
            }
            Err(source) if attempt >= attempts => {
                tracing::error!(attempts, error = %source, "database unreachable");
                return Err(DatabaseError::ConnectionFailed { attempts, source }.into());
            }
            Err(e) => {
                tracing::warn!(
                    attempt,
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "database connection failed"
                );
                sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
        }
    }
}

/// Runs `SELECT 1`; used by `/readyz`.
pub async fn health_check(db: &DatabaseConnection) -> Result<()> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());

    db.query_one(stmt)
        .await
        .context("database health check failed")?;

    Ok(())
}
