use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the metadata format understood by `replace_metadata`.
pub const METADATA_VERSION: u32 = 2;

fn default_version() -> u32 {
    METADATA_VERSION
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Hasura metadata document (`version: 2`).
///
/// Only `tables` is interpreted; any other top-level key an instance
/// returns from `export_metadata` is ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Metadata {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            version: METADATA_VERSION,
            tables: Vec::new(),
        }
    }
}

impl Metadata {
    pub fn new(tables: Vec<TableEntry>) -> Self {
        Self {
            version: METADATA_VERSION,
            tables,
        }
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&TableEntry> {
        self.tables
            .iter()
            .find(|t| t.table.schema == schema && t.table.name == name)
    }
}

/// Identity of a tracked table. Two entries describe the same table when
/// both schema and name match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedTable {
    pub schema: String,
    pub name: String,
}

impl QualifiedTable {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }
}

/// One tracked table or view with its relationships and permissions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TableEntry {
    pub table: QualifiedTable,
    #[serde(default)]
    pub object_relationships: Vec<Relationship>,
    #[serde(default)]
    pub array_relationships: Vec<Relationship>,
    #[serde(default)]
    pub select_permissions: Vec<SelectPermission>,

    /// Keys this crate never generates (insert permissions, event
    /// triggers, ...), kept as-is for tables owned by someone else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableEntry {
    pub fn new(schema: &str, name: &str) -> Self {
        Self {
            table: QualifiedTable::new(schema, name),
            object_relationships: Vec::new(),
            array_relationships: Vec::new(),
            select_permissions: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Relationship {
    pub name: String,
    pub using: RelationshipUsing,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Relationship {
    /// Many-to-one relationship following `column` on the owning table.
    pub fn object(name: &str, column: &str) -> Self {
        Self {
            name: name.to_string(),
            using: RelationshipUsing {
                foreign_key_constraint_on: Some(ForeignKeyConstraint::Column(
                    column.to_string(),
                )),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// One-to-many relationship following `column` on the remote `table`.
    pub fn array(name: &str, table: QualifiedTable, column: &str) -> Self {
        Self {
            name: name.to_string(),
            using: RelationshipUsing {
                foreign_key_constraint_on: Some(ForeignKeyConstraint::Remote {
                    column: column.to_string(),
                    table,
                }),
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RelationshipUsing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key_constraint_on: Option<ForeignKeyConstraint>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ForeignKeyConstraint {
    /// Column on the owning table.
    Column(String),

    /// Column on another table pointing back at the owning one.
    Remote { column: String, table: QualifiedTable },

    /// Any other shape an instance may hold.
    Other(Value),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SelectPermission {
    pub role: String,
    pub permission: Permission,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SelectPermission {
    /// All columns, all rows, aggregations allowed.
    pub fn wildcard(role: &str) -> Self {
        Self {
            role: role.to_string(),
            permission: Permission {
                columns: Columns::Wildcard("*".to_string()),
                filter: empty_object(),
                allow_aggregations: true,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Permission {
    pub columns: Columns,
    #[serde(default = "empty_object")]
    pub filter: Value,
    #[serde(default)]
    pub allow_aggregations: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Columns {
    Wildcard(String),
    Named(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_table_entry_serializes_in_hasura_shape() {
        let mut entry = TableEntry::new("public", "token");
        entry
            .object_relationships
            .push(Relationship::object("holder", "holder_id"));
        entry.select_permissions.push(SelectPermission::wildcard("user"));

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "table": {"schema": "public", "name": "token"},
                "object_relationships": [
                    {"name": "holder", "using": {"foreign_key_constraint_on": "holder_id"}}
                ],
                "array_relationships": [],
                "select_permissions": [
                    {
                        "role": "user",
                        "permission": {"columns": "*", "filter": {}, "allow_aggregations": true}
                    }
                ]
            })
        );
    }

    #[test]
    fn test_foreign_entries_keep_unknown_keys() {
        let remote = json!({
            "version": 2,
            "tables": [{
                "table": {"schema": "public", "name": "legacy"},
                "insert_permissions": [{"role": "admin", "permission": {"check": {}}}],
                "array_relationships": [{
                    "name": "items",
                    "using": {"manual_configuration": {"remote_table": "item"}}
                }]
            }],
            "remote_schemas": []
        });

        let metadata: Metadata = serde_json::from_value(remote).unwrap();
        let legacy = metadata.table("public", "legacy").unwrap();

        assert!(legacy.extra.contains_key("insert_permissions"));
        assert_eq!(legacy.array_relationships[0].using.foreign_key_constraint_on, None);
        assert!(legacy.array_relationships[0]
            .using
            .extra
            .contains_key("manual_configuration"));
    }
}
