use crate::StoreResult;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// A model instance as stored: column name to JSON value.
pub type Row = Map<String, Value>;

/// Conjunction of `column = value` conditions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Whether `row` satisfies every condition.
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, value)| row.get(column) == Some(value))
    }

    /// The filter as a JSON object, for containment queries.
    pub fn to_json(&self) -> Value {
        Value::Object(self.conditions.iter().cloned().collect())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .conditions
            .iter()
            .map(|(column, value)| format!("{column}={value}"))
            .collect::<Vec<_>>();
        write!(f, "({})", parts.join(", "))
    }
}

/// Relational store that handlers read from and write to.
///
/// Transactions, if any, are the implementation's concern.
#[async_trait]
pub trait Store: Send {
    /// All rows of `table` matching `filter`, in storage order.
    async fn select(&mut self, table: &str, filter: &Filter) -> StoreResult<Vec<Row>>;

    /// Insert a new row, failing with an integrity error if `pk` is taken.
    async fn insert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()>;

    /// Insert a row, or replace the one sharing its `pk`.
    async fn upsert(&mut self, table: &str, pk: &str, row: Row) -> StoreResult<()>;
}
