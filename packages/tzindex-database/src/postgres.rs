use crate::{
    queries,
    store::{Filter, Row, Store},
    IndexerConnection, IndexerConnectionPool, ModelRegistry, StoreError, StoreResult,
};
use async_trait::async_trait;
use tracing::info;

/// Store backed by a PostgreSQL schema. Every read and write goes through
/// the connection stashed by [`PostgresStore::start_transaction`].
#[derive(Debug)]
pub struct PostgresStore {
    pub pool: IndexerConnectionPool,
    stashed: Option<IndexerConnection>,
    pub schema: String,
}

impl PostgresStore {
    pub async fn new(conn_uri: &str, schema: &str) -> StoreResult<PostgresStore> {
        let pool = IndexerConnectionPool::connect(conn_uri).await?;
        Ok(Self::from_pool(pool, schema))
    }

    pub fn from_pool(pool: IndexerConnectionPool, schema: &str) -> Self {
        PostgresStore {
            pool,
            stashed: None,
            schema: schema.to_string(),
        }
    }

    pub async fn start_transaction(&mut self) -> StoreResult<usize> {
        let mut conn = self.pool.acquire().await?;
        let result = queries::execute_query(&mut conn, "BEGIN".into()).await?;

        self.stashed = Some(conn);

        Ok(result)
    }

    pub async fn commit_transaction(&mut self) -> StoreResult<usize> {
        let mut conn = self
            .stashed
            .take()
            .ok_or(StoreError::NoTransactionError)?;
        Ok(queries::execute_query(&mut conn, "COMMIT".into()).await?)
    }

    pub async fn revert_transaction(&mut self) -> StoreResult<usize> {
        let mut conn = self
            .stashed
            .take()
            .ok_or(StoreError::NoTransactionError)?;
        Ok(queries::execute_query(&mut conn, "ROLLBACK".into()).await?)
    }

    /// Create the schema and a table for every concrete registered model.
    pub async fn create_tables(&mut self, registry: &ModelRegistry) -> StoreResult<()> {
        let statements = queries::create_schema_statements(&self.schema, registry)?;
        let mut conn = self.pool.acquire().await?;
        for statement in statements {
            queries::execute_query(&mut conn, statement).await?;
        }
        info!(
            "Created {} tables in schema `{}`.",
            registry.concrete().count(),
            self.schema
        );
        Ok(())
    }

    fn conn(&mut self) -> StoreResult<&mut IndexerConnection> {
        self.stashed.as_mut().ok_or(StoreError::NoTransactionError)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(e) => e.code().as_deref() == Some("23505"),
        _ => false,
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn select(&mut self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>> {
        let schema = self.schema.clone();
        let conn = self.conn()?;
        Ok(queries::select_rows(conn, &schema, table, filter.to_json()).await?)
    }

    async fn insert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()> {
        let schema = self.schema.clone();
        let conn = self.conn()?;
        match queries::insert_row(conn, &schema, table, row).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::IntegrityError {
                table: table.to_string(),
                message: format!("duplicate key value for `{pk}`: {e}"),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn upsert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()> {
        let schema = self.schema.clone();
        let conn = self.conn()?;
        queries::upsert_row(conn, &schema, table, pk, row).await?;
        Ok(())
    }
}
