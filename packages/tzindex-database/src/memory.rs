use crate::{
    store::{Filter, Row, Store},
    StoreError, StoreResult,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::trace;

/// In-process store keeping every table as an insertion-ordered list of rows.
///
/// Used for dry runs and tests; nothing is persisted.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<Row>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every row currently held in `table`.
    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables.get(table).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    fn position(&self, table: &str, pk: &str, row: &Row) -> Option<usize> {
        let key = row.get(pk)?;
        self.tables
            .get(table)?
            .iter()
            .position(|existing| existing.get(pk) == Some(key))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&mut self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>> {
        Ok(self
            .rows(table)
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect())
    }

    async fn insert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()> {
        if !row.contains_key(pk) {
            return Err(StoreError::IntegrityError {
                table: table.to_string(),
                message: format!("missing primary key `{pk}`"),
            });
        }

        if self.position(table, pk, &row).is_some() {
            return Err(StoreError::IntegrityError {
                table: table.to_string(),
                message: format!("duplicate key value for `{pk}`: {}", row[pk]),
            });
        }

        trace!("INSERT INTO {table}: {row:?}");
        self.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }

    async fn upsert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()> {
        match self.position(table, pk, &row) {
            Some(idx) => {
                trace!("UPDATE {table}: {row:?}");
                if let Some(rows) = self.tables.get_mut(table) {
                    rows[idx] = row;
                }
                Ok(())
            }
            None => self.insert(table, pk, row).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_memory_store_inserts_selects_and_upserts() {
        let mut store = MemoryStore::new();

        store
            .insert("token", "id", row(json!({"id": 1, "holder_id": "tz1a"})))
            .await
            .unwrap();
        store
            .insert("token", "id", row(json!({"id": 2, "holder_id": "tz1a"})))
            .await
            .unwrap();

        let held = store
            .select("token", &Filter::new().eq("holder_id", "tz1a"))
            .await
            .unwrap();
        assert_eq!(held.len(), 2);

        store
            .upsert("token", "id", row(json!({"id": 1, "holder_id": "tz1b"})))
            .await
            .unwrap();

        let rows = store.rows("token");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["holder_id"], json!("tz1b"));
        assert_eq!(rows[1]["holder_id"], json!("tz1a"));
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_keys() {
        let mut store = MemoryStore::new();
        store
            .insert("address", "address", row(json!({"address": "tz1a"})))
            .await
            .unwrap();

        let err = store
            .insert("address", "address", row(json!({"address": "tz1a"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IntegrityError { .. }));
    }
}
