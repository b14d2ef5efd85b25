// storefront/src/db/mod.rs

//! Postgres-backed implementations of the cart gateway and order store.

pub mod cart_gateway;
pub mod order_store;

pub use cart_gateway::PgCartGateway;
pub use order_store::PgOrderStore;

use crate::config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use toolcart::GatewayError;
use tracing::{error, info};

const INIT_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

pub async fn connect(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
  let pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .connect(&config.database_url)
    .await?;
  info!(max_connections = config.database_max_connections, "Database pool ready.");
  Ok(pool)
}

/// Applies the schema. Every statement is idempotent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
  sqlx::raw_sql(INIT_SCHEMA).execute(pool).await?;
  info!("Database schema applied.");
  Ok(())
}

/// Logs a storage failure with its context and wraps it for the gateway boundary.
pub(crate) fn storage_err(context: &'static str) -> impl Fn(sqlx::Error) -> GatewayError {
  move |e| {
    error!("{}: {}", context, e);
    GatewayError::storage(e)
  }
}
