use crate::{
    store::{Filter, Row, Store},
    StoreError, StoreResult,
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use tzindex_lib::utils::pascal_to_snake;

/// Storage type of a single column.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ColumnType {
    BigInt,
    Integer,
    Boolean,
    Text,
    /// Tezos addresses (`tz1…`, `KT1…`).
    Address,
    Timestamp,
}

impl ColumnType {
    /// Derive the respective PostgreSQL field type.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::BigInt => "bigint",
            ColumnType::Integer => "integer",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
            ColumnType::Address => "varchar(36)",
            ColumnType::Timestamp => "timestamptz",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Plain value column.
    Data(ColumnType),

    /// Reference to another model's primary key, stored in `<field>_id`.
    ForeignKey {
        /// Qualified name (`app.Name`) of the referenced model.
        model: &'static str,

        /// Name of the reverse relation on the referenced model.
        related_name: Option<&'static str>,

        /// Storage type of the referenced primary key.
        column_type: ColumnType,
    },
}

/// Typed description of one field of a model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: FieldKind,
    primary_key: bool,
    nullable: bool,
}

impl FieldDescriptor {
    pub fn primary_key(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            kind: FieldKind::Data(column_type),
            primary_key: true,
            nullable: false,
        }
    }

    pub fn column(name: &'static str, column_type: ColumnType) -> Self {
        Self {
            name,
            kind: FieldKind::Data(column_type),
            primary_key: false,
            nullable: false,
        }
    }

    pub fn foreign_key(
        name: &'static str,
        model: &'static str,
        related_name: Option<&'static str>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::ForeignKey {
                model,
                related_name,
                column_type,
            },
            primary_key: false,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Name of the field as declared on the model.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_foreign_key(&self) -> bool {
        matches!(self.kind, FieldKind::ForeignKey { .. })
    }

    /// Name of the backing column; foreign keys are stored in `<field>_id`.
    pub fn column_name(&self) -> String {
        match self.kind {
            FieldKind::ForeignKey { .. } => format!("{}_id", self.name),
            FieldKind::Data(_) => self.name.to_string(),
        }
    }

    /// Qualified name of the referenced model, for foreign keys.
    pub fn related_model(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::ForeignKey { model, .. } => Some(model),
            FieldKind::Data(_) => None,
        }
    }

    /// Declared reverse relation name, for foreign keys.
    pub fn related_name(&self) -> Option<&'static str> {
        match self.kind {
            FieldKind::ForeignKey { related_name, .. } => related_name,
            FieldKind::Data(_) => None,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self.kind {
            FieldKind::Data(t) => t,
            FieldKind::ForeignKey { column_type, .. } => column_type,
        }
    }

    /// Column definition fragment for `CREATE TABLE`.
    pub fn sql_fragment(&self) -> String {
        let null_frag = if self.nullable { "" } else { "not null" };
        let pk_frag = if self.primary_key { "primary key" } else { "" };
        format!(
            "{} {} {} {}",
            self.column_name(),
            self.column_type().sql_type(),
            null_frag,
            pk_frag
        )
        .trim()
        .to_string()
    }
}

/// Static description of a model: where it lives and what it holds.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModelDescriptor {
    app: &'static str,
    name: &'static str,
    table: Option<&'static str>,
    is_abstract: bool,
    fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(app: &'static str, name: &'static str) -> Self {
        Self {
            app,
            name,
            table: None,
            is_abstract: false,
            fields: Vec::new(),
        }
    }

    /// Override the table name otherwise derived from the model name.
    pub fn table(mut self, table: &'static str) -> Self {
        self.table = Some(table);
        self
    }

    /// Mark the model as abstract: it is never backed by a table.
    pub fn abstract_model(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn app(&self) -> &'static str {
        self.app
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// `app.Name`, the key foreign keys refer to this model by.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.app, self.name)
    }

    pub fn table_name(&self) -> String {
        match self.table {
            Some(table) => table.to_string(),
            None => pascal_to_snake(self.name),
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_foreign_key())
    }

    /// Name of the primary key column (`id` when none is declared).
    pub fn pk_column(&self) -> String {
        self.fields
            .iter()
            .find(|f| f.is_primary_key())
            .map(|f| f.column_name())
            .unwrap_or_else(|| "id".to_string())
    }
}

/// A record type persisted by handlers.
///
/// Rows are the model's serde representation, so field names in the struct
/// must match [`FieldDescriptor::column_name`] (foreign keys end in `_id`).
#[async_trait]
pub trait Model: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn descriptor() -> ModelDescriptor;

    fn table_name() -> String {
        Self::descriptor().table_name()
    }

    fn to_row(&self) -> StoreResult<Row> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            _ => Err(StoreError::InvalidRow(Self::descriptor().qualified_name())),
        }
    }

    fn from_row(row: Row) -> StoreResult<Self> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    fn filter(filter: Filter) -> Query<Self> {
        Query::new(filter)
    }

    /// Fetch the instance with the given primary key.
    async fn get<K>(store: &mut dyn Store, pk: K) -> StoreResult<Self>
    where
        K: Into<Value> + Send,
    {
        let filter = Filter::new().eq(Self::descriptor().pk_column(), pk);
        Self::filter(filter).get(store).await
    }

    /// Insert or update this instance.
    async fn save(&self, store: &mut dyn Store) -> StoreResult<()> {
        let descriptor = Self::descriptor();
        store
            .upsert(
                &descriptor.table_name(),
                &descriptor.pk_column(),
                self.to_row()?,
            )
            .await
    }

    /// Insert this instance, failing if its primary key is taken.
    async fn create(self, store: &mut dyn Store) -> StoreResult<Self> {
        let descriptor = Self::descriptor();
        store
            .insert(
                &descriptor.table_name(),
                &descriptor.pk_column(),
                self.to_row()?,
            )
            .await?;
        Ok(self)
    }

    /// Fetch the single instance matching `filter`, creating it from
    /// `defaults` when there is none. The flag is `true` when created.
    async fn get_or_create<F>(
        store: &mut dyn Store,
        filter: Filter,
        defaults: F,
    ) -> StoreResult<(Self, bool)>
    where
        F: FnOnce() -> Self + Send,
    {
        match Self::filter(filter).first_unique(store).await? {
            Some(found) => Ok((found, false)),
            None => Ok((defaults().create(store).await?, true)),
        }
    }
}

/// A pending lookup of `M` rows.
#[derive(Debug, Clone)]
pub struct Query<M> {
    filter: Filter,
    _model: PhantomData<M>,
}

impl<M: Model> Query<M> {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            _model: PhantomData,
        }
    }

    pub async fn all(self, store: &mut dyn Store) -> StoreResult<Vec<M>> {
        store
            .select(&M::table_name(), &self.filter)
            .await?
            .into_iter()
            .map(M::from_row)
            .collect()
    }

    /// Exactly one match, or [`StoreError::DoesNotExist`] /
    /// [`StoreError::MultipleObjectsReturned`].
    pub async fn get(self, store: &mut dyn Store) -> StoreResult<M> {
        let table = M::table_name();
        let filter = self.filter.to_string();
        match self.first_unique(store).await? {
            Some(m) => Ok(m),
            None => Err(StoreError::DoesNotExist { table, filter }),
        }
    }

    /// At most one match; more than one is an error.
    pub async fn first_unique(self, store: &mut dyn Store) -> StoreResult<Option<M>> {
        let table = M::table_name();
        let filter = self.filter.to_string();
        let mut rows = store.select(&table, &self.filter).await?;
        match rows.len() {
            0 => Ok(None),
            1 => Ok(Some(M::from_row(rows.remove(0))?)),
            _ => Err(StoreError::MultipleObjectsReturned { table, filter }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
    struct Holding {
        id: u64,
        holder: String,
    }

    impl Model for Holding {
        fn descriptor() -> ModelDescriptor {
            ModelDescriptor::new("models", "Holding")
                .field(FieldDescriptor::primary_key("id", ColumnType::BigInt))
                .field(FieldDescriptor::column("holder", ColumnType::Address))
        }
    }

    async fn two_holdings_of(holder: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        for id in [1, 2] {
            Holding {
                id,
                holder: holder.to_string(),
            }
            .create(&mut store)
            .await
            .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_get_fails_on_multiple_matches() {
        let mut store = two_holdings_of("tz1a").await;

        let err = Holding::filter(Filter::new().eq("holder", "tz1a"))
            .get(&mut store)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::MultipleObjectsReturned { ref table, .. } if table == "holding"
        ));

        let err = Holding::filter(Filter::new().eq("holder", "tz1b"))
            .get(&mut store)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DoesNotExist { .. }));
    }

    #[tokio::test]
    async fn test_get_or_create_fails_on_multiple_matches() {
        let mut store = two_holdings_of("tz1a").await;

        let err = Holding::get_or_create(&mut store, Filter::new().eq("holder", "tz1a"), || {
            Holding {
                id: 3,
                holder: "tz1a".to_string(),
            }
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::MultipleObjectsReturned { .. }));
        assert_eq!(store.rows("holding").len(), 2);

        let (created, was_created) =
            Holding::get_or_create(&mut store, Filter::new().eq("holder", "tz1b"), || Holding {
                id: 3,
                holder: "tz1b".to_string(),
            })
            .await
            .unwrap();
        assert!(was_created);
        assert_eq!(created.id, 3);
        assert_eq!(store.rows("holding").len(), 3);
    }
}
