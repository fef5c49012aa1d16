use crate::{
    metadata::{Metadata, QualifiedTable, Relationship, SelectPermission, TableEntry},
    HasuraError, HasuraResult,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use tzindex_database::ModelRegistry;
use tzindex_lib::defaults;

/// Tables keyed by name, in first-seen order.
#[derive(Default)]
struct TableSet {
    tables: Vec<TableEntry>,
    slots: HashMap<String, usize>,
}

impl TableSet {
    /// Register a fresh entry for `name`. A name seen before keeps its
    /// position but starts over empty.
    fn reset(&mut self, schema: &str, name: &str) -> &mut TableEntry {
        let entry = TableEntry::new(schema, name);
        let idx = match self.slots.get(name) {
            Some(&idx) => {
                self.tables[idx] = entry;
                idx
            }
            None => {
                self.slots.insert(name.to_string(), self.tables.len());
                self.tables.push(entry);
                self.tables.len() - 1
            }
        };
        &mut self.tables[idx]
    }

    fn get_mut(&mut self, name: &str) -> HasuraResult<&mut TableEntry> {
        let idx = *self
            .slots
            .get(name)
            .ok_or_else(|| HasuraError::UnknownModel(name.to_string()))?;
        Ok(&mut self.tables[idx])
    }
}

/// Build the metadata document for every concrete model in `registry` and
/// every view in `views`, all tracked under `schema`.
pub fn generate(
    registry: &ModelRegistry,
    views: &[String],
    schema: &str,
) -> HasuraResult<Metadata> {
    info!("Generating Hasura metadata");

    let role = defaults::HASURA_SELECT_ROLE;
    let mut set = TableSet::default();
    let mut model_tables = HashMap::new();

    for model in registry.concrete() {
        let table = model.table_name();
        set.reset(schema, &table);
        model_tables.insert(model.qualified_name(), table);
    }

    for view in views {
        set.reset(schema, view)
            .select_permissions
            .push(SelectPermission::wildcard(role));
    }

    for model in registry.concrete() {
        let qualified = model.qualified_name();
        let table = &model_tables[&qualified];

        set.get_mut(table)?
            .select_permissions
            .push(SelectPermission::wildcard(role));

        for field in model.foreign_keys() {
            let related_name = field.related_name().ok_or_else(|| {
                HasuraError::ConfigurationError(format!(
                    "`related_name` of `{}.{}` must be set",
                    qualified,
                    field.name()
                ))
            })?;
            let target = field.related_model().unwrap_or_default();
            let related_table = model_tables
                .get(target)
                .ok_or_else(|| HasuraError::UnknownModel(target.to_string()))?;
            let column = field.column_name();

            debug!("{table}.{} -> {related_table} ({related_name})", field.name());

            set.get_mut(table)?
                .object_relationships
                .push(Relationship::object(field.name(), &column));
            set.get_mut(related_table)?
                .array_relationships
                .push(Relationship::array(
                    related_name,
                    QualifiedTable::new(schema, table.as_str()),
                    &column,
                ));
        }
    }

    Ok(Metadata::new(set.tables))
}

/// Append every table of `existing` whose identity is absent from
/// `generated`. Generated entries always win.
pub fn merge(mut generated: Metadata, existing: Metadata) -> Metadata {
    let mut known = generated
        .tables
        .iter()
        .map(|t| t.table.clone())
        .collect::<HashSet<_>>();

    for table in existing.tables {
        if known.insert(table.table.clone()) {
            debug!("Keeping foreign table {}.{}", table.table.schema, table.table.name);
            generated.tables.push(table);
        }
    }

    generated
}
