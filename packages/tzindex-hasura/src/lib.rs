//! # tzindex-hasura
//!
//! Hasura metadata for the tables an indexer owns: generation from the
//! model registry, merge with an instance's existing metadata, and the
//! client that pushes the result.

#![deny(unused_crate_dependencies)]

pub mod client;
pub mod generator;
pub mod metadata;

pub use client::HasuraClient;
pub use generator::{generate, merge};
pub use metadata::Metadata;

use serde_json::Value;
use thiserror::Error;
use tracing::info;
use tzindex_database::{queries, IndexerConnectionPool, ModelRegistry, StoreError};
use tzindex_lib::config::IndexerConfig;

pub type HasuraResult<T> = core::result::Result<T, HasuraError>;

#[derive(Debug, Error)]
pub enum HasuraError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Foreign key references unregistered model `{0}`")]
    UnknownModel(String),
    #[error("Hasura instance not responding after {attempts} health checks")]
    Unhealthy { attempts: usize },
    #[error("Can't configure Hasura instance: {0}")]
    Rejected(Value),
    #[error("HTTP error: {0:?}")]
    Http(#[from] reqwest::Error),
    #[error("Serde error: {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] StoreError),
}

/// Generate metadata for `registry` plus every view of the configured
/// schema, and apply it to the configured Hasura instance.
pub async fn configure_hasura(
    config: &IndexerConfig,
    registry: &ModelRegistry,
    pool: &IndexerConnectionPool,
) -> HasuraResult<Metadata> {
    let hasura = config.hasura.as_ref().ok_or_else(|| {
        HasuraError::ConfigurationError("`hasura` config section missing".to_string())
    })?;

    info!("Configuring Hasura");
    let schema = config.database.schema_name();

    let mut conn = pool.acquire().await.map_err(StoreError::from)?;
    let views = queries::views(&mut conn, schema)
        .await
        .map_err(StoreError::from)?;

    let metadata = generate(registry, &views, schema)?;
    HasuraClient::new(hasura)?.configure(metadata).await
}
