use crate::{IndexerConnection, ModelDescriptor, ModelRegistry, Row, StoreResult};
use serde_json::Value;
use tzindex_lib::utils::pascal_to_snake;

fn table_ident(schema: &str, table: &str) -> String {
    format!("\"{schema}\".\"{table}\"")
}

fn column_list(row: &Row) -> String {
    row.keys()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE TABLE` statement for a concrete model. Foreign keys reference
/// the primary key of the target's table as resolved through `registry`.
pub fn create_table_query(
    schema: &str,
    model: &ModelDescriptor,
    registry: &ModelRegistry,
) -> String {
    let mut defs = model
        .fields()
        .iter()
        .map(|f| f.sql_fragment())
        .collect::<Vec<_>>();

    if !model.fields().iter().any(|f| f.is_primary_key()) {
        defs.insert(0, "id bigint not null primary key".to_string());
    }

    for field in model.foreign_keys() {
        let target = field.related_model().unwrap_or_default();
        let table = match registry.get(target) {
            Some(referenced) => referenced.table_name(),
            None => target
                .split_once('.')
                .map(|(_, name)| pascal_to_snake(name))
                .unwrap_or_else(|| pascal_to_snake(target)),
        };
        defs.push(format!(
            "FOREIGN KEY ({}) REFERENCES {}",
            field.column_name(),
            table_ident(schema, &table)
        ));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table_ident(schema, &model.table_name()),
        defs.join(", ")
    )
}

/// Every statement needed to create `schema` and the registry's tables.
pub fn create_schema_statements(
    schema: &str,
    registry: &ModelRegistry,
) -> StoreResult<Vec<String>> {
    let mut statements = vec![format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\"")];
    statements.extend(
        registry
            .creation_order()?
            .into_iter()
            .map(|model| create_table_query(schema, model, registry)),
    );
    Ok(statements)
}

pub async fn execute_query(
    conn: &mut IndexerConnection,
    query: String,
) -> sqlx::Result<usize> {
    match conn {
        IndexerConnection::Postgres(ref mut c) => postgres::execute_query(c, query).await,
    }
}

/// Names of the views defined in `schema`.
pub async fn views(conn: &mut IndexerConnection, schema: &str) -> sqlx::Result<Vec<String>> {
    match conn {
        IndexerConnection::Postgres(ref mut c) => postgres::views(c, schema).await,
    }
}

pub async fn select_rows(
    conn: &mut IndexerConnection,
    schema: &str,
    table: &str,
    filter: Value,
) -> sqlx::Result<Vec<Row>> {
    match conn {
        IndexerConnection::Postgres(ref mut c) => {
            postgres::select_rows(c, schema, table, filter).await
        }
    }
}

pub async fn insert_row(
    conn: &mut IndexerConnection,
    schema: &str,
    table: &str,
    row: Row,
) -> sqlx::Result<usize> {
    match conn {
        IndexerConnection::Postgres(ref mut c) => {
            postgres::insert_row(c, schema, table, row).await
        }
    }
}

pub async fn upsert_row(
    conn: &mut IndexerConnection,
    schema: &str,
    table: &str,
    pk: &str,
    row: Row,
) -> sqlx::Result<usize> {
    match conn {
        IndexerConnection::Postgres(ref mut c) => {
            postgres::upsert_row(c, schema, table, pk, row).await
        }
    }
}

mod postgres {
    use super::{column_list, table_ident};
    use crate::Row;
    use serde_json::Value;
    use sqlx::{pool::PoolConnection, types::Json, Postgres, Row as _};
    use tracing::debug;

    pub async fn execute_query(
        conn: &mut PoolConnection<Postgres>,
        query: String,
    ) -> sqlx::Result<usize> {
        debug!("{query}");
        let result = sqlx::query(&query).execute(conn).await?;
        Ok(result.rows_affected() as usize)
    }

    pub async fn views(
        conn: &mut PoolConnection<Postgres>,
        schema: &str,
    ) -> sqlx::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT table_name::text FROM information_schema.views WHERE table_schema = $1",
        )
        .bind(schema)
        .fetch_all(conn)
        .await?;

        rows.iter().map(|r| r.try_get::<String, usize>(0)).collect()
    }

    pub async fn select_rows(
        conn: &mut PoolConnection<Postgres>,
        schema: &str,
        table: &str,
        filter: Value,
    ) -> sqlx::Result<Vec<Row>> {
        let query = format!(
            "SELECT to_jsonb(t) FROM {} AS t WHERE to_jsonb(t) @> $1",
            table_ident(schema, table)
        );
        debug!("{query} <- {filter}");

        let rows = sqlx::query(&query)
            .bind(Json(filter))
            .fetch_all(conn)
            .await?;

        rows.iter()
            .map(|r| {
                let Json(row) = r.try_get::<Json<Row>, usize>(0)?;
                Ok(row)
            })
            .collect()
    }

    pub async fn insert_row(
        conn: &mut PoolConnection<Postgres>,
        schema: &str,
        table: &str,
        row: Row,
    ) -> sqlx::Result<usize> {
        let ident = table_ident(schema, table);
        let columns = column_list(&row);
        let query = format!(
            "INSERT INTO {ident} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{ident}, $1)"
        );
        debug!("{query}");

        let result = sqlx::query(&query)
            .bind(Json(Value::Object(row)))
            .execute(conn)
            .await?;
        Ok(result.rows_affected() as usize)
    }

    pub async fn upsert_row(
        conn: &mut PoolConnection<Postgres>,
        schema: &str,
        table: &str,
        pk: &str,
        row: Row,
    ) -> sqlx::Result<usize> {
        let ident = table_ident(schema, table);
        let columns = column_list(&row);
        let updates = row
            .keys()
            .filter(|c| c.as_str() != pk)
            .map(|c| format!("\"{c}\" = EXCLUDED.\"{c}\""))
            .collect::<Vec<_>>();
        let conflict = if updates.is_empty() {
            "DO NOTHING".to_string()
        } else {
            format!("DO UPDATE SET {}", updates.join(", "))
        };
        let query = format!(
            "INSERT INTO {ident} ({columns}) SELECT {columns} FROM jsonb_populate_record(NULL::{ident}, $1) ON CONFLICT (\"{pk}\") {conflict}"
        );
        debug!("{query}");

        let result = sqlx::query(&query)
            .bind(Json(Value::Object(row)))
            .execute(conn)
            .await?;
        Ok(result.rows_affected() as usize)
    }
}
