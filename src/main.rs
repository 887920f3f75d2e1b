//! # Eventosnow API Main Entry Point
//!
//! Loads configuration, opens the database, applies migrations and serves.

use std::sync::Arc;

use anyhow::Context;
use eventosnow::{
    aws::load_sdk_config,
    config::ConfigLoader,
    db::init_pool,
    identity::CognitoClient,
    migration::{Migrator, MigratorTrait},
    server::{AppState, run_server},
    storage::S3Storage,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;

    init_tracing(&config).context("failed to initialise tracing")?;

    tracing::info!(profile = %config.profile, "configuration loaded");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "effective configuration");
    }

    let db = init_pool(&config).await?;
    Migrator::up(&db, None)
        .await
        .context("failed to apply migrations")?;

    let sdk_config = load_sdk_config(&config).await;
    let identity = CognitoClient::from_config(&sdk_config, &config);
    let storage = S3Storage::from_config(&sdk_config, &config);

    let state = AppState {
        config: Arc::new(config),
        db,
        identity: Arc::new(identity),
        storage: Arc::new(storage),
    };

    run_server(state).await
}
