//! # tzindex-database
//!
//! Model descriptors, the model registry, and the stores that handlers
//! persist models into.

#![deny(unused_crate_dependencies)]

pub mod internal;
pub mod memory;
pub mod model;
pub mod postgres;
pub mod queries;
pub mod registry;
pub mod store;

pub use memory::MemoryStore;
pub use model::{ColumnType, FieldDescriptor, FieldKind, Model, ModelDescriptor, Query};
pub use postgres::PostgresStore;
pub use registry::ModelRegistry;
pub use store::{Filter, Row, Store};

use sqlx::{pool::PoolConnection, postgres::PgConnectOptions, Error as SqlxError};
use std::str::FromStr;
use thiserror::Error;
use tzindex_lib::utils::attempt_database_connection;

/// Result type returned by store operations.
pub type StoreResult<T> = core::result::Result<T, StoreError>;

/// Error type returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{table} matching {filter} does not exist")]
    DoesNotExist { table: String, filter: String },
    #[error("Multiple {table} rows returned for {filter}, expected exactly one")]
    MultipleObjectsReturned { table: String, filter: String },
    #[error("Integrity error on {table}: {message}")]
    IntegrityError { table: String, message: String },
    #[error("Model {0} does not serialize into a row")]
    InvalidRow(String),
    #[error("Foreign key cycle through {0}")]
    ForeignKeyCycle(String),
    #[error("Invalid connection string: {0:?}")]
    InvalidConnectionString(String),
    #[error("Database backend not supported: {0:?}")]
    BackendNotSupported(String),
    #[error("No transaction is open.")]
    NoTransactionError,
    #[error("Serialization error: {0:?}")]
    Serde(#[from] serde_json::Error),
    #[error("Error from sqlx: {0:#?}")]
    SqlxError(#[from] SqlxError),
}

#[derive(Debug)]
pub enum IndexerConnection {
    Postgres(Box<PoolConnection<sqlx::Postgres>>),
}

#[derive(Clone, Debug)]
pub enum IndexerConnectionPool {
    Postgres(sqlx::Pool<sqlx::Postgres>),
}

impl IndexerConnectionPool {
    pub async fn connect(database_url: &str) -> StoreResult<IndexerConnectionPool> {
        let url = url::Url::parse(database_url).map_err(|_| {
            StoreError::InvalidConnectionString(database_url.to_string())
        })?;

        match url.scheme() {
            "postgres" => {
                let options = PgConnectOptions::from_str(database_url)?;
                let pool = attempt_database_connection(|| {
                    sqlx::postgres::PgPoolOptions::new().connect_with(options.clone())
                })
                .await?;

                Ok(IndexerConnectionPool::Postgres(pool))
            }
            err => Err(StoreError::BackendNotSupported(err.into())),
        }
    }

    pub async fn acquire(&self) -> sqlx::Result<IndexerConnection> {
        match self {
            IndexerConnectionPool::Postgres(p) => {
                Ok(IndexerConnection::Postgres(Box::new(p.acquire().await?)))
            }
        }
    }
}
